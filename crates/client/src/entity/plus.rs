//! STAplus ownership, licensing and provenance entities

use super::{Datastream, MultiDatastream, Observation, Thing};
use crate::time::Timestamp;
use serde_json::{Map, Value};

entity! {
    /// A person or institution that owns data.
    pub struct Party {
        values {
            description, set_description, with_description: String => "description";
            auth_id, set_auth_id, with_auth_id: String => "authId";
            role, set_role, with_role: String => "role";
            display_name, set_display_name, with_display_name: String => "displayName";
        }
        one {}
        many {
            datastreams, set_datastreams, with_datastreams, query_datastreams: Datastream => "Datastreams";
            multi_datastreams, set_multi_datastreams, with_multi_datastreams, query_multi_datastreams: MultiDatastream => "MultiDatastreams";
            things, set_things, with_things, query_things: Thing => "Things";
            campaigns, set_campaigns, with_campaigns, query_campaigns: Campaign => "Campaigns";
            observation_groups, set_observation_groups, with_observation_groups, query_observation_groups: ObservationGroup => "ObservationGroups";
        }
    }
}

entity! {
    pub struct License {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            definition, set_definition, with_definition: String => "definition";
            logo, set_logo, with_logo: String => "logo";
            attribution_text, set_attribution_text, with_attribution_text: String => "attributionText";
        }
        one {}
        many {
            datastreams, set_datastreams, with_datastreams, query_datastreams: Datastream => "Datastreams";
            multi_datastreams, set_multi_datastreams, with_multi_datastreams, query_multi_datastreams: MultiDatastream => "MultiDatastreams";
            campaigns, set_campaigns, with_campaigns, query_campaigns: Campaign => "Campaigns";
            observation_groups, set_observation_groups, with_observation_groups, query_observation_groups: ObservationGroup => "ObservationGroups";
        }
    }
}

entity! {
    /// A data collection effort run by a party, possibly under a license.
    pub struct Campaign {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            classification, set_classification, with_classification: String => "classification";
            terms_of_use, set_terms_of_use, with_terms_of_use: String => "termsOfUse";
            privacy_policy, set_privacy_policy, with_privacy_policy: String => "privacyPolicy";
            creation_time, set_creation_time, with_creation_time: Timestamp => "creationTime";
            start_time, set_start_time, with_start_time: Timestamp => "startTime";
            end_time, set_end_time, with_end_time: Timestamp => "endTime";
            url, set_url, with_url: String => "url";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {
            party, set_party, with_party, query_party: Party => "Party";
            license, set_license, with_license, query_license: License => "License";
        }
        many {
            datastreams, set_datastreams, with_datastreams, query_datastreams: Datastream => "Datastreams";
            multi_datastreams, set_multi_datastreams, with_multi_datastreams, query_multi_datastreams: MultiDatastream => "MultiDatastreams";
            observation_groups, set_observation_groups, with_observation_groups, query_observation_groups: ObservationGroup => "ObservationGroups";
        }
    }
}

entity! {
    pub struct ObservationGroup {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            purpose, set_purpose, with_purpose: String => "purpose";
            terms_of_use, set_terms_of_use, with_terms_of_use: String => "termsOfUse";
            privacy_policy, set_privacy_policy, with_privacy_policy: String => "privacyPolicy";
            creation_time, set_creation_time, with_creation_time: Timestamp => "creationTime";
            end_time, set_end_time, with_end_time: Timestamp => "endTime";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
            data_quality, set_data_quality, with_data_quality: Map<String, Value> => "dataQuality";
        }
        one {
            party, set_party, with_party, query_party: Party => "Party";
            license, set_license, with_license, query_license: License => "License";
        }
        many {
            observations, set_observations, with_observations, query_observations: Observation => "Observations";
            relations, set_relations, with_relations, query_relations: Relation => "Relations";
            campaigns, set_campaigns, with_campaigns, query_campaigns: Campaign => "Campaigns";
        }
    }
}

entity! {
    /// Directed link between two observations, `Subject` to `Object`.
    pub struct Relation {
        values {
            description, set_description, with_description: String => "description";
            role, set_role, with_role: String => "role";
            external_resource, set_external_resource, with_external_resource: String => "externalResource";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {
            subject, set_subject, with_subject, query_subject: Observation => "Subject";
            object, set_object, with_object, query_object: Observation => "Object";
        }
        many {
            observation_groups, set_observation_groups, with_observation_groups, query_observation_groups: ObservationGroup => "ObservationGroups";
        }
    }
}

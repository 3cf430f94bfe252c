//! Core SensorThings entity types with their STAplus relations

use super::{Campaign, License, ObservationGroup, Party, Relation};
use crate::field::UnitOfMeasurement;
use crate::time::{TimeValue, Timestamp};
use serde_json::{Map, Value};

entity! {
    /// An object of the physical or information world that can be observed.
    pub struct Thing {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {
            party, set_party, with_party, query_party: Party => "Party";
        }
        many {
            locations, set_locations, with_locations, query_locations: Location => "Locations";
            historical_locations, set_historical_locations, with_historical_locations, query_historical_locations: HistoricalLocation => "HistoricalLocations";
            datastreams, set_datastreams, with_datastreams, query_datastreams: Datastream => "Datastreams";
            multi_datastreams, set_multi_datastreams, with_multi_datastreams, query_multi_datastreams: MultiDatastream => "MultiDatastreams";
        }
    }
}

entity! {
    /// Last known position of one or more things, usually GeoJSON.
    pub struct Location {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            encoding_type, set_encoding_type, with_encoding_type: String => "encodingType";
            location, set_location, with_location: Value => "location";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {}
        many {
            things, set_things, with_things, query_things: Thing => "Things";
            historical_locations, set_historical_locations, with_historical_locations, query_historical_locations: HistoricalLocation => "HistoricalLocations";
        }
    }
}

entity! {
    pub struct HistoricalLocation {
        values {
            time, set_time, with_time: Timestamp => "time";
        }
        one {
            thing, set_thing, with_thing, query_thing: Thing => "Thing";
        }
        many {
            locations, set_locations, with_locations, query_locations: Location => "Locations";
        }
    }
}

entity! {
    pub struct Sensor {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            encoding_type, set_encoding_type, with_encoding_type: String => "encodingType";
            metadata, set_metadata, with_metadata: Value => "metadata";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {}
        many {
            datastreams, set_datastreams, with_datastreams, query_datastreams: Datastream => "Datastreams";
            multi_datastreams, set_multi_datastreams, with_multi_datastreams, query_multi_datastreams: MultiDatastream => "MultiDatastreams";
        }
    }
}

entity! {
    pub struct ObservedProperty {
        values {
            name, set_name, with_name: String => "name";
            definition, set_definition, with_definition: String => "definition";
            description, set_description, with_description: String => "description";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {}
        many {
            datastreams, set_datastreams, with_datastreams, query_datastreams: Datastream => "Datastreams";
            multi_datastreams, set_multi_datastreams, with_multi_datastreams, query_multi_datastreams: MultiDatastream => "MultiDatastreams";
        }
    }
}

entity! {
    pub struct FeatureOfInterest {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            encoding_type, set_encoding_type, with_encoding_type: String => "encodingType";
            feature, set_feature, with_feature: Value => "feature";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {}
        many {
            observations, set_observations, with_observations, query_observations: Observation => "Observations";
        }
    }
}

entity! {
    /// Groups observations of one observed property, produced by one sensor
    /// on one thing.
    pub struct Datastream {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            observation_type, set_observation_type, with_observation_type: String => "observationType";
            unit_of_measurement, set_unit_of_measurement, with_unit_of_measurement: UnitOfMeasurement => "unitOfMeasurement";
            observed_area, set_observed_area, with_observed_area: Value => "observedArea";
            phenomenon_time, set_phenomenon_time, with_phenomenon_time: TimeValue => "phenomenonTime";
            result_time, set_result_time, with_result_time: TimeValue => "resultTime";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {
            thing, set_thing, with_thing, query_thing: Thing => "Thing";
            sensor, set_sensor, with_sensor, query_sensor: Sensor => "Sensor";
            observed_property, set_observed_property, with_observed_property, query_observed_property: ObservedProperty => "ObservedProperty";
            party, set_party, with_party, query_party: Party => "Party";
            license, set_license, with_license, query_license: License => "License";
        }
        many {
            observations, set_observations, with_observations, query_observations: Observation => "Observations";
            campaigns, set_campaigns, with_campaigns, query_campaigns: Campaign => "Campaigns";
        }
    }
}

entity! {
    /// A datastream whose observations carry one result per observed property.
    pub struct MultiDatastream {
        values {
            name, set_name, with_name: String => "name";
            description, set_description, with_description: String => "description";
            unit_of_measurements, set_unit_of_measurements, with_unit_of_measurements: Vec<UnitOfMeasurement> => "unitOfMeasurements";
            observation_type, set_observation_type, with_observation_type: String => "observationType";
            multi_observation_data_types, set_multi_observation_data_types, with_multi_observation_data_types: Vec<String> => "multiObservationDataTypes";
            observed_area, set_observed_area, with_observed_area: Value => "observedArea";
            phenomenon_time, set_phenomenon_time, with_phenomenon_time: TimeValue => "phenomenonTime";
            result_time, set_result_time, with_result_time: TimeValue => "resultTime";
            properties, set_properties, with_properties: Map<String, Value> => "properties";
        }
        one {
            thing, set_thing, with_thing, query_thing: Thing => "Thing";
            sensor, set_sensor, with_sensor, query_sensor: Sensor => "Sensor";
            party, set_party, with_party, query_party: Party => "Party";
            license, set_license, with_license, query_license: License => "License";
        }
        many {
            observed_properties, set_observed_properties, with_observed_properties, query_observed_properties: ObservedProperty => "ObservedProperties";
            observations, set_observations, with_observations, query_observations: Observation => "Observations";
            campaigns, set_campaigns, with_campaigns, query_campaigns: Campaign => "Campaigns";
        }
    }
}

entity! {
    /// A single measured value.
    ///
    /// `Subjects` lists the relations this observation is the object of and
    /// `Objects` those it is the subject of, as the server addresses them.
    pub struct Observation {
        values {
            phenomenon_time, set_phenomenon_time, with_phenomenon_time: TimeValue => "phenomenonTime";
            result, set_result, with_result: Value => "result";
            result_time, set_result_time, with_result_time: Timestamp => "resultTime";
            result_quality, set_result_quality, with_result_quality: Value => "resultQuality";
            valid_time, set_valid_time, with_valid_time: TimeValue => "validTime";
            parameters, set_parameters, with_parameters: Map<String, Value> => "parameters";
        }
        one {
            datastream, set_datastream, with_datastream, query_datastream: Datastream => "Datastream";
            multi_datastream, set_multi_datastream, with_multi_datastream, query_multi_datastream: MultiDatastream => "MultiDatastream";
            feature_of_interest, set_feature_of_interest, with_feature_of_interest, query_feature_of_interest: FeatureOfInterest => "FeatureOfInterest";
        }
        many {
            observation_groups, set_observation_groups, with_observation_groups, query_observation_groups: ObservationGroup => "ObservationGroups";
            subjects, set_subjects, with_subjects, query_subjects: Relation => "Subjects";
            objects, set_objects, with_objects, query_objects: Relation => "Objects";
        }
    }
}

//! Engine schema generation from validated descriptors
//!
//! Each descriptor becomes one entity with:
//! - the binary payload attribute
//! - the identifier attribute, if declared
//! - one indexed attribute per index

use crate::engine::{AttributeDescription, AttributeType, EntityDescription, SchemaDescription};
use crate::observability::Logger;
use crate::schema::{
    AnyDocumentDescriptor, StorageInformation, ValidatedDescriptors, DOCUMENT_DATA_ATTRIBUTE,
};

/// Builds the schema for a store.
pub fn schema_description(
    identifier: &str,
    descriptors: &ValidatedDescriptors,
    logger: &dyn Logger,
) -> SchemaDescription {
    let count = descriptors.len().to_string();
    logger.debug(
        "MODEL_GENERATING",
        &[("identifier", identifier), ("entities", &count)],
    );

    SchemaDescription {
        identifier: identifier.to_string(),
        entities: descriptors
            .iter()
            .map(|descriptor| entity_description(descriptor, logger))
            .collect(),
    }
}

fn entity_description(descriptor: &AnyDocumentDescriptor, logger: &dyn Logger) -> EntityDescription {
    logger.trace("MODEL_ENTITY", &[("entity", descriptor.name())]);

    let mut attributes = vec![AttributeDescription {
        name: DOCUMENT_DATA_ATTRIBUTE.to_string(),
        attribute_type: AttributeType::Binary,
        indexed: false,
        optional: false,
    }];
    attributes.extend(
        descriptor
            .identifier()
            .into_iter()
            .chain(descriptor.indices())
            .map(attribute_description),
    );

    for attribute in &attributes {
        let attribute_type = attribute.attribute_type.to_string();
        logger.trace(
            "MODEL_ATTRIBUTE",
            &[
                ("attribute", &attribute.name),
                ("entity", descriptor.name()),
                ("type", &attribute_type),
            ],
        );
    }

    EntityDescription {
        name: descriptor.name().to_string(),
        attributes,
    }
}

fn attribute_description(info: &StorageInformation) -> AttributeDescription {
    AttributeDescription {
        name: info.property_name.as_str().to_string(),
        attribute_type: AttributeType::Storage(info.storage_type),
        indexed: true,
        optional: info.is_optional,
    }
}

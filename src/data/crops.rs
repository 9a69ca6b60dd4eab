use bevy::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::{read_data_file, DataError};
use crate::shared::*;

/// All crop definitions known to the game, keyed by id.
///
/// Definitions are handed out as `Arc`s so every planted crop shares the
/// same immutable record.
#[derive(Resource, Debug, Clone, Default)]
pub struct CropCatalog {
    crops: HashMap<CropId, Arc<CropDefinition>>,
}

impl CropCatalog {
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CropDefinition>,
    ) -> Result<Self, DataError> {
        let mut catalog = Self::default();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Parse a RON list of `CropDefinition`s.
    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        let definitions: Vec<CropDefinition> = ron::from_str(source)?;
        Self::from_definitions(definitions)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let catalog = Self::from_ron_str(&read_data_file(path.as_ref())?)?;
        info!(
            "[Data] Crops loaded: {} from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, definition: CropDefinition) -> Result<Arc<CropDefinition>, DataError> {
        validate_definition(&definition)?;
        if self.crops.contains_key(&definition.id) {
            return Err(DataError::DuplicateCrop(definition.id));
        }
        let definition = Arc::new(definition);
        self.crops
            .insert(definition.id.clone(), Arc::clone(&definition));
        Ok(definition)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<CropDefinition>> {
        self.crops.get(id)
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CropDefinition>> {
        self.crops.values()
    }
}

/// Check the structural rules every crop definition must satisfy.
pub fn validate_definition(definition: &CropDefinition) -> Result<(), DataError> {
    let invalid = |reason: String| DataError::InvalidCrop {
        id: definition.id.clone(),
        reason,
    };

    if definition.growth_stage_count == 0 {
        return Err(invalid("growth_stage_count must be at least 1".into()));
    }
    if definition.min_yield == 0 {
        return Err(invalid("min_yield must be at least 1".into()));
    }
    if definition.min_yield > definition.max_yield {
        return Err(invalid(format!(
            "min_yield {} exceeds max_yield {}",
            definition.min_yield, definition.max_yield
        )));
    }
    if definition.is_regrowable {
        let Some(regrow) = definition.regrow_stage_index else {
            return Err(invalid("regrowable crop needs a regrow_stage_index".into()));
        };
        if regrow >= definition.final_stage_index() {
            return Err(invalid(format!(
                "regrow_stage_index {} must be below the final stage {}",
                regrow,
                definition.final_stage_index()
            )));
        }
    }
    Ok(())
}

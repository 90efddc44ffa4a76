//! Table metadata file loading

use std::path::Path;

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use widecol_core::schema::TableBuilder;
use widecol_core::InMemoryProvider;

/// Contents of a metadata file: a list of `[[tables]]`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataFile {
    /// Schemas that exist even without tables
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub tables: Vec<TableBuilder>,
}

impl MetadataFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading metadata file {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err_with(|| format!("parsing metadata file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Provider whose cache already holds every table of the file
    pub fn into_provider(self) -> Result<InMemoryProvider> {
        let provider = InMemoryProvider::new();
        for schema in &self.schemas {
            provider.create_schema(schema);
        }
        for builder in self.tables {
            let name = format!("{}.{}", builder.schema, builder.name);
            let table = builder
                .build()
                .map_err(miette::Report::new)
                .wrap_err_with(|| format!("invalid table {}", name))?;
            provider.publish(table);
        }
        provider.sync_all();
        Ok(provider)
    }
}

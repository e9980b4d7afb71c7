//! Provisioning plan types and construction.
//!
//! A plan is an explicit ordered list of idempotent steps. Each step carries
//! the catalog and schema names it operates on, so execution never depends
//! on session state established by an earlier step. The constructors encode
//! the ordering rules: parents are created before children, children are
//! dropped before parents.

use crate::catalog::TableRef;

/// Comment attached to the workshop catalog on creation.
pub const CATALOG_COMMENT: &str = "Catalog for Databricks MCP Workshop";

/// Comment attached to the workshop schema on creation.
pub const SCHEMA_COMMENT: &str = "Default schema for workshop tables and functions";

/// A single idempotent provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionStep {
    /// Create the catalog unless it already exists.
    EnsureCatalog {
        /// Catalog name.
        name: String,
        /// Comment attached on creation.
        comment: String,
    },
    /// Select the catalog as the session default.
    SelectCatalog {
        /// Catalog name.
        name: String,
    },
    /// Create the schema unless it already exists.
    EnsureSchema {
        /// Owning catalog.
        catalog: String,
        /// Schema name.
        name: String,
        /// Comment attached on creation.
        comment: String,
    },
    /// Select the schema as the session default.
    SelectSchema {
        /// Owning catalog.
        catalog: String,
        /// Schema name.
        name: String,
    },
    /// Drop a table if it exists.
    DropTable {
        /// The table to drop.
        table: TableRef,
    },
    /// Drop the schema if it exists.
    DropSchema {
        /// Owning catalog.
        catalog: String,
        /// Schema name.
        name: String,
        /// Whether contained objects are dropped as well.
        cascade: bool,
    },
    /// Drop the catalog if it exists.
    DropCatalog {
        /// Catalog name.
        name: String,
        /// Whether contained schemas are dropped as well.
        cascade: bool,
    },
}

impl ProvisionStep {
    /// Returns the short identifier naming this step in reports and errors.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::EnsureCatalog { name, .. } => format!("ensure-catalog:{name}"),
            Self::SelectCatalog { name } => format!("select-catalog:{name}"),
            Self::EnsureSchema { catalog, name, .. } => {
                format!("ensure-schema:{catalog}.{name}")
            }
            Self::SelectSchema { catalog, name } => {
                format!("select-schema:{catalog}.{name}")
            }
            Self::DropTable { table } => format!("drop-table:{table}"),
            Self::DropSchema { catalog, name, .. } => {
                format!("drop-schema:{catalog}.{name}")
            }
            Self::DropCatalog { name, .. } => format!("drop-catalog:{name}"),
        }
    }

    /// Returns a human-readable description of the step.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::EnsureCatalog { name, .. } => format!("Create catalog '{name}' if absent"),
            Self::SelectCatalog { name } => format!("Select catalog '{name}'"),
            Self::EnsureSchema { catalog, name, .. } => {
                format!("Create schema '{catalog}.{name}' if absent")
            }
            Self::SelectSchema { catalog, name } => {
                format!("Select schema '{catalog}.{name}'")
            }
            Self::DropTable { table } => format!("Drop table '{table}' if it exists"),
            Self::DropSchema { catalog, name, cascade } => {
                if *cascade {
                    format!("Drop schema '{catalog}.{name}' and its contents")
                } else {
                    format!("Drop schema '{catalog}.{name}' if it exists")
                }
            }
            Self::DropCatalog { name, cascade } => {
                if *cascade {
                    format!("Drop catalog '{name}' and its contents")
                } else {
                    format!("Drop catalog '{name}' if it exists")
                }
            }
        }
    }
}

impl std::fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// An ordered provisioning plan for one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    /// Catalog the plan operates on.
    pub catalog: String,
    /// Steps in execution order.
    pub steps: Vec<ProvisionStep>,
}

impl ProvisionPlan {
    /// Builds the plan that brings the workshop environment up.
    ///
    /// Creation is parent-first: the catalog exists before its schema. The
    /// select steps pin the session defaults so participant sessions start
    /// in the right place.
    #[must_use]
    pub fn provision(catalog: &str, schema: &str) -> Self {
        let steps = vec![
            ProvisionStep::EnsureCatalog {
                name: catalog.to_string(),
                comment: CATALOG_COMMENT.to_string(),
            },
            ProvisionStep::SelectCatalog {
                name: catalog.to_string(),
            },
            ProvisionStep::EnsureSchema {
                catalog: catalog.to_string(),
                name: schema.to_string(),
                comment: SCHEMA_COMMENT.to_string(),
            },
            ProvisionStep::SelectSchema {
                catalog: catalog.to_string(),
                name: schema.to_string(),
            },
        ];

        Self {
            catalog: catalog.to_string(),
            steps,
        }
    }

    /// Builds the plan that removes workshop resources.
    ///
    /// Deletion is child-first: tables in the given order, then, only when
    /// `cascade` is set, the schema and finally the catalog. Without
    /// `cascade` the catalog and schema are preserved.
    #[must_use]
    pub fn teardown(catalog: &str, schema: &str, tables: &[String], cascade: bool) -> Self {
        let mut steps: Vec<ProvisionStep> = tables
            .iter()
            .map(|table| ProvisionStep::DropTable {
                table: TableRef::new(catalog, schema, table),
            })
            .collect();

        if cascade {
            steps.push(ProvisionStep::DropSchema {
                catalog: catalog.to_string(),
                name: schema.to_string(),
                cascade: true,
            });
            steps.push(ProvisionStep::DropCatalog {
                name: catalog.to_string(),
                cascade: true,
            });
        }

        Self {
            catalog: catalog.to_string(),
            steps,
        }
    }

    /// Returns true if the plan has no steps.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the number of steps.
    #[must_use]
    pub const fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl std::fmt::Display for ProvisionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "No steps planned for catalog '{}'", self.catalog);
        }

        writeln!(f, "Plan for catalog '{}' ({} steps):", self.catalog, self.steps.len())?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {}. {step}", i + 1)?;
        }

        Ok(())
    }
}

//! Catalog provider abstraction and its SQL implementation.
//!
//! The provider trait is the seam between the provisioning workflows and the
//! platform. Every operation is idempotent by contract: creates are
//! if-absent, drops are if-exists, so re-running a plan converges instead of
//! failing.

use async_trait::async_trait;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::error::ProviderResult;

use super::client::StatementClient;

/// Fully qualified reference to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Catalog holding the table.
    pub catalog: String,
    /// Schema holding the table.
    pub schema: String,
    /// Table name.
    pub table: String,
}

impl TableRef {
    /// Creates a new table reference.
    #[must_use]
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Returns the backtick-quoted fully qualified name for use in SQL.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!(
            "{}.{}.{}",
            quote_ident(&self.catalog),
            quote_ident(&self.schema),
            quote_ident(&self.table)
        )
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

/// Idempotent catalog operations offered by the platform.
///
/// Schema operations take the owning catalog explicitly; no operation
/// depends on session state established by an earlier call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Creates a catalog unless it already exists.
    async fn create_catalog_if_absent(&self, name: &str, comment: &str) -> ProviderResult<()>;

    /// Selects a catalog as the session default.
    async fn use_catalog(&self, name: &str) -> ProviderResult<()>;

    /// Creates a schema in the given catalog unless it already exists.
    async fn create_schema_if_absent(
        &self,
        catalog: &str,
        name: &str,
        comment: &str,
    ) -> ProviderResult<()>;

    /// Selects a schema as the session default.
    async fn use_schema(&self, catalog: &str, name: &str) -> ProviderResult<()>;

    /// Drops a table if it exists.
    async fn drop_table_if_exists(&self, table: &TableRef) -> ProviderResult<()>;

    /// Drops a schema if it exists. With `cascade`, contained objects are
    /// dropped as well.
    async fn drop_schema_if_exists(
        &self,
        catalog: &str,
        name: &str,
        cascade: bool,
    ) -> ProviderResult<()>;

    /// Drops a catalog if it exists. With `cascade`, contained schemas are
    /// dropped as well.
    async fn drop_catalog_if_exists(&self, name: &str, cascade: bool) -> ProviderResult<()>;
}

/// Catalog provider backed by the SQL statement execution API.
#[derive(Debug, Clone)]
pub struct SqlCatalogProvider {
    /// Statement client issuing the rendered SQL.
    client: StatementClient,
}

impl SqlCatalogProvider {
    /// Creates a provider over the given statement client.
    #[must_use]
    pub const fn new(client: StatementClient) -> Self {
        Self { client }
    }

    /// Executes one rendered statement, discarding the statement id.
    async fn run(&self, sql: &str) -> ProviderResult<()> {
        let statement_id = self.client.execute_statement(sql).await?;
        debug!("Statement {statement_id} completed");
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for SqlCatalogProvider {
    async fn create_catalog_if_absent(&self, name: &str, comment: &str) -> ProviderResult<()> {
        self.run(&render_create_catalog(name, comment)).await
    }

    async fn use_catalog(&self, name: &str) -> ProviderResult<()> {
        self.run(&render_use_catalog(name)).await
    }

    async fn create_schema_if_absent(
        &self,
        catalog: &str,
        name: &str,
        comment: &str,
    ) -> ProviderResult<()> {
        self.run(&render_create_schema(catalog, name, comment)).await
    }

    async fn use_schema(&self, catalog: &str, name: &str) -> ProviderResult<()> {
        self.run(&render_use_schema(catalog, name)).await
    }

    async fn drop_table_if_exists(&self, table: &TableRef) -> ProviderResult<()> {
        self.run(&render_drop_table(table)).await
    }

    async fn drop_schema_if_exists(
        &self,
        catalog: &str,
        name: &str,
        cascade: bool,
    ) -> ProviderResult<()> {
        self.run(&render_drop_schema(catalog, name, cascade)).await
    }

    async fn drop_catalog_if_exists(&self, name: &str, cascade: bool) -> ProviderResult<()> {
        self.run(&render_drop_catalog(name, cascade)).await
    }
}

// Statement rendering. Identifiers are backtick-quoted, literals
// single-quoted, with embedded quote characters doubled.

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn render_create_catalog(name: &str, comment: &str) -> String {
    format!(
        "CREATE CATALOG IF NOT EXISTS {} COMMENT {}",
        quote_ident(name),
        quote_literal(comment)
    )
}

fn render_use_catalog(name: &str) -> String {
    format!("USE CATALOG {}", quote_ident(name))
}

fn render_create_schema(catalog: &str, name: &str, comment: &str) -> String {
    format!(
        "CREATE SCHEMA IF NOT EXISTS {}.{} COMMENT {}",
        quote_ident(catalog),
        quote_ident(name),
        quote_literal(comment)
    )
}

fn render_use_schema(catalog: &str, name: &str) -> String {
    format!("USE SCHEMA {}.{}", quote_ident(catalog), quote_ident(name))
}

fn render_drop_table(table: &TableRef) -> String {
    format!("DROP TABLE IF EXISTS {}", table.quoted())
}

fn render_drop_schema(catalog: &str, name: &str, cascade: bool) -> String {
    let mut sql = format!(
        "DROP SCHEMA IF EXISTS {}.{}",
        quote_ident(catalog),
        quote_ident(name)
    );
    if cascade {
        sql.push_str(" CASCADE");
    }
    sql
}

fn render_drop_catalog(name: &str, cascade: bool) -> String {
    let mut sql = format!("DROP CATALOG IF EXISTS {}", quote_ident(name));
    if cascade {
        sql.push_str(" CASCADE");
    }
    sql
}

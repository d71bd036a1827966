//! Connection and statement execution
//!
//! [`MySQLConnector`] opens a single `mysql_async::Conn` (no pool) from a
//! [`ConnectionTarget`]. Tests substitute their own [`Connector`].

use crate::error::StatementError;
use crate::plan::ConnectionTarget;
use crate::sql::Statement;
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};
use secrecy::ExposeSecret;

/// Opens connections to the provisioning target.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: StatementExecutor;

    async fn connect(&self, target: &ConnectionTarget) -> Result<Self::Connection, StatementError>;
}

/// A live connection able to run administrative statements.
#[async_trait]
pub trait StatementExecutor: Send {
    async fn execute(&mut self, statement: &Statement) -> Result<(), StatementError>;

    /// Release the connection.
    async fn close(self) -> Result<(), StatementError>
    where
        Self: Sized;
}

/// Connector for a real MySQL server.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySQLConnector;

#[async_trait]
impl Connector for MySQLConnector {
    type Connection = MySQLConnection;

    async fn connect(&self, target: &ConnectionTarget) -> Result<MySQLConnection, StatementError> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(target.host.clone())
            .tcp_port(target.port)
            .user(Some(target.username.expose_secret()))
            .pass(Some(target.password.expose_secret()));

        let conn = Conn::new(opts).await?;
        Ok(MySQLConnection { conn })
    }
}

/// A single admin connection.
pub struct MySQLConnection {
    conn: Conn,
}

#[async_trait]
impl StatementExecutor for MySQLConnection {
    async fn execute(&mut self, statement: &Statement) -> Result<(), StatementError> {
        // Text protocol: account management statements take no placeholders
        self.conn.query_drop(statement.sql()).await?;
        Ok(())
    }

    async fn close(self) -> Result<(), StatementError> {
        self.conn.disconnect().await?;
        Ok(())
    }
}

//! MySQL-backed session using the `mysql` crate's blocking text protocol.

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Value};
use tracing::debug;

use super::{Connector, Credentials, DbError, Row, Session};
use crate::config::ConnectionConfig;
use crate::naming::Identifier;
use crate::sql::quote_identifier;

impl From<mysql::Error> for DbError {
    fn from(e: mysql::Error) -> Self {
        match e {
            mysql::Error::MySqlError(server) => DbError::with_code(server.code, server.message),
            other => DbError::new(other.to_string()),
        }
    }
}

/// Connects over the configured socket (or TCP host/port).
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlConnector;

pub struct MysqlSession {
    conn: Conn,
}

impl Connector for MysqlConnector {
    type Session = MysqlSession;

    fn connect(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> Result<MysqlSession, DbError> {
        let mut opts = OptsBuilder::new()
            .user(Some(credentials.user.as_str()))
            .pass(Some(credentials.password.as_str()))
            .db_name(Some(credentials.database.as_str()))
            .tcp_port(config.port);
        if let Some(host) = config.host.as_deref() {
            opts = opts.ip_or_hostname(Some(host));
        }
        if let Some(socket) = config.socket.as_ref() {
            opts = opts.socket(Some(socket.to_string_lossy().into_owned()));
        }

        debug!(
            user = %credentials.user,
            database = %credentials.database,
            host = config.host.as_deref().unwrap_or("<socket>"),
            port = config.port,
            "Connecting to MySQL"
        );
        let conn = Conn::new(opts)?;
        Ok(MysqlSession { conn })
    }
}

fn value_to_text(v: Value) -> Option<String> {
    match v {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        other => Some(other.as_sql(true)),
    }
}

impl Session for MysqlSession {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, DbError> {
        let rows: Vec<mysql::Row> = self.conn.query(sql)?;
        Ok(rows
            .into_iter()
            // mysql::Row::unwrap hands back the column values
            .map(|row| row.unwrap().into_iter().map(value_to_text).collect())
            .collect())
    }

    fn lock_table_write(&mut self, table: &Identifier) -> Result<(), DbError> {
        self.conn
            .query_drop(format!("LOCK TABLES {} WRITE", quote_identifier(table.as_str())))?;
        Ok(())
    }

    fn unlock_all(&mut self) -> Result<(), DbError> {
        self.conn.query_drop("UNLOCK TABLES")?;
        Ok(())
    }
}

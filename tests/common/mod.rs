//! In-memory stand-in for a MySQL server.
//!
//! Answers the two catalog queries the relocator issues, records lock and
//! unlock calls, and can be told to fail at each step.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use move_partition::naming::Identifier;
use move_partition::{ConnectionConfig, Connector, Credentials, DbError, RelocationRequest, Row, Session};

#[derive(Debug, Default)]
pub struct ServerState {
    pub datadir: Option<String>,
    pub partitions: Vec<(String, String)>,
    pub fail_connect: bool,
    pub fail_query: bool,
    pub fail_lock: bool,
    pub fail_unlock: bool,
    pub locked: Option<String>,
    pub lock_calls: usize,
    pub unlock_calls: usize,
    pub connects: usize,
    pub open_sessions: usize,
    pub queries: Vec<String>,
    pub last_user: Option<String>,
    pub last_database: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeServer {
    pub state: Rc<RefCell<ServerState>>,
}

impl FakeServer {
    pub fn new(datadir: &Path) -> Self {
        let server = Self::default();
        server.state.borrow_mut().datadir = Some(format!("{}/", datadir.display()));
        server
    }

    pub fn with_partition(self, table: &str, partition: &str) -> Self {
        self.state
            .borrow_mut()
            .partitions
            .push((table.to_string(), partition.to_string()));
        self
    }

    pub fn state(&self) -> std::cell::Ref<'_, ServerState> {
        self.state.borrow()
    }

    pub fn configure(&self, f: impl FnOnce(&mut ServerState)) {
        f(&mut self.state.borrow_mut());
    }
}

pub struct FakeSession {
    state: Rc<RefCell<ServerState>>,
}

impl Connector for FakeServer {
    type Session = FakeSession;

    fn connect(
        &self,
        _cfg: &ConnectionConfig,
        creds: &Credentials,
    ) -> Result<Self::Session, DbError> {
        let mut st = self.state.borrow_mut();
        st.connects += 1;
        if st.fail_connect {
            return Err(DbError::with_code(
                1045,
                format!("Access denied for user '{}'@'localhost'", creds.user),
            ));
        }
        st.open_sessions += 1;
        st.last_user = Some(creds.user.clone());
        st.last_database = Some(creds.database.clone());
        Ok(FakeSession {
            state: Rc::clone(&self.state),
        })
    }
}

/// Contents of every `'...'` literal in `sql`, in order.
fn literals(sql: &str) -> Vec<String> {
    sql.split('\'')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

impl Session for FakeSession {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, DbError> {
        let mut st = self.state.borrow_mut();
        st.queries.push(sql.to_string());
        if st.fail_query {
            return Err(DbError::with_code(2013, "Lost connection to MySQL server during query"));
        }
        let lits = literals(sql);
        if sql.starts_with("SHOW VARIABLES") {
            return Ok(match (lits.first().map(String::as_str), &st.datadir) {
                (Some("datadir"), Some(dir)) => {
                    vec![vec![Some("datadir".to_string()), Some(dir.clone())]]
                }
                _ => Vec::new(),
            });
        }
        if sql.contains("`PARTITIONS`") {
            let count = st
                .partitions
                .iter()
                .filter(|(t, p)| lits.len() == 2 && *t == lits[0] && *p == lits[1])
                .count();
            return Ok(vec![vec![Some(count.to_string())]]);
        }
        Err(DbError::with_code(1064, format!("unexpected query: {sql}")))
    }

    fn lock_table_write(&mut self, table: &Identifier) -> Result<(), DbError> {
        let mut st = self.state.borrow_mut();
        st.lock_calls += 1;
        if st.fail_lock {
            return Err(DbError::with_code(
                1205,
                "Lock wait timeout exceeded; try restarting transaction",
            ));
        }
        st.locked = Some(table.to_string());
        Ok(())
    }

    fn unlock_all(&mut self) -> Result<(), DbError> {
        let mut st = self.state.borrow_mut();
        st.unlock_calls += 1;
        if st.fail_unlock {
            return Err(DbError::with_code(2006, "MySQL server has gone away"));
        }
        st.locked = None;
        Ok(())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.state.borrow_mut().open_sessions -= 1;
    }
}

/// A data directory with one partition file, and an empty archive directory.
pub struct Layout {
    pub _td: tempfile::TempDir,
    pub datadir: PathBuf,
    pub archive: PathBuf,
}

impl Layout {
    pub fn new() -> Self {
        let td = tempfile::tempdir().unwrap();
        let datadir = td.path().join("mysql");
        let archive = td.path().join("archive");
        fs::create_dir_all(datadir.join("shop")).unwrap();
        fs::create_dir_all(&archive).unwrap();
        Self {
            _td: td,
            datadir,
            archive,
        }
    }

    pub fn source(&self, table: &str, partition: &str) -> PathBuf {
        self.datadir.join("shop").join(format!("{table}#P#{partition}.ibd"))
    }

    pub fn destination(&self, table: &str, partition: &str) -> PathBuf {
        self.archive.join("shop").join(format!("{table}#P#{partition}.ibd"))
    }

    /// Write a partition file with `data` and mode 0640.
    pub fn write_partition(&self, table: &str, partition: &str, data: &[u8]) -> PathBuf {
        let p = self.source(table, partition);
        fs::write(&p, data).unwrap();
        fs::set_permissions(&p, fs::Permissions::from_mode(0o640)).unwrap();
        p
    }

    pub fn request(&self, table: &str, partition: &str) -> RelocationRequest {
        RelocationRequest::new("admin", "secret", "shop", table, partition, &self.archive).unwrap()
    }
}

pub fn page_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

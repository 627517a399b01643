use std::fs;
use std::io;
use std::path::PathBuf;

use arcade_core::employee::{Employee, EmployeeId};

/// Storage key the selector persists the last-played-as snapshot under.
pub const STORAGE_KEY: &str = "company-arcade-employee";

/// Durable string key-value store backed by one file per key. Writes go
/// through a temp file and rename so a crash never leaves a torn value.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    pub fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))
    }

    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path(key));
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

/// Tracks which employee is playing and remembers the choice across visits.
///
/// Rehydration is forgiving: a stored snapshot whose id no longer matches
/// the current roster is dropped without complaint, since the roster is
/// admin-editable and shrinks out from under old selections.
pub struct EmployeeSelector {
    employees: Vec<Employee>,
    store: LocalStore,
    selected: Option<usize>,
}

impl EmployeeSelector {
    pub fn new(employees: Vec<Employee>, store: LocalStore) -> Self {
        let selected = store
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str::<Employee>(&raw).ok())
            .and_then(|stored| employees.iter().position(|e| e.id == stored.id));
        Self {
            employees,
            store,
            selected,
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn selected(&self) -> Option<&Employee> {
        self.selected.and_then(|i| self.employees.get(i))
    }

    /// Select by id. Unknown ids are rejected and leave the current
    /// selection untouched.
    pub fn select(&mut self, id: EmployeeId) -> bool {
        let Some(index) = self.employees.iter().position(|e| e.id == id) else {
            return false;
        };
        self.selected = Some(index);
        match serde_json::to_string(&self.employees[index]) {
            Ok(snapshot) => {
                if let Err(err) = self.store.set(STORAGE_KEY, &snapshot) {
                    tracing::warn!(error = %err, "failed to persist employee selection");
                }
            },
            Err(err) => tracing::warn!(error = %err, "failed to encode employee selection"),
        }
        true
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.store.remove(STORAGE_KEY);
    }
}

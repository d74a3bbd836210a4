use crate::schema::{Student, TeacherRow};

/// Handed out by `begin_refresh`; installing rows with anything but the
/// most recently issued token is rejected (last-issued-wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshToken(u64);

/// In-memory record sets, replaced wholesale on every successful refresh.
/// Never patched incrementally; a failed refresh leaves both sets intact.
#[derive(Debug, Default)]
pub struct DataStore {
    students: Vec<Student>,
    teachers: Vec<TeacherRow>,
    issued: u64,
}

impl DataStore {
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.issued += 1;
        RefreshToken(self.issued)
    }

    /// Installs both sets atomically. Returns false (and keeps the current
    /// data) when a newer refresh was issued after `token`.
    pub fn install(
        &mut self,
        token: RefreshToken,
        students: Vec<Student>,
        teachers: Vec<TeacherRow>,
    ) -> bool {
        if token.0 != self.issued {
            tracing::warn!(
                stale = token.0,
                current = self.issued,
                "dropping stale refresh result"
            );
            return false;
        }
        self.students = students;
        self.teachers = teachers;
        true
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn teachers(&self) -> &[TeacherRow] {
        &self.teachers
    }

    pub fn clear(&mut self) {
        self.students.clear();
        self.teachers.clear();
    }
}

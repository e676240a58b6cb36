use tracing::{info, instrument};

use models::{ActivityKind, Student, StudentInput};

use crate::errors::ServiceError;
use crate::school::{SchoolStore, Settings};

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub class_name: Option<String>,
    pub active: Option<bool>,
}

impl StudentFilter {
    fn matches(&self, s: &Student) -> bool {
        self.class_name.as_deref().map_or(true, |c| s.class_name == c)
            && self.active.map_or(true, |a| s.active == a)
    }
}

/// Student roster CRUD. Deleting a student also deletes their attendance.
#[derive(Clone)]
pub struct StudentService {
    store: SchoolStore,
    settings: Settings,
}

impl StudentService {
    pub fn new(store: SchoolStore, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub async fn list(&self, filter: &StudentFilter) -> Vec<Student> {
        self.store
            .read(|data| data.students.values().filter(|s| filter.matches(s)).cloned().collect())
            .await
    }

    pub async fn get(&self, id: u64) -> Option<Student> {
        self.store.read(|data| data.students.get(id).cloned()).await
    }

    pub async fn get_by_code(&self, code: &str) -> Option<Student> {
        self.store.read(|data| data.student_by_code(code).cloned()).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: StudentInput) -> Result<Student, ServiceError> {
        let input = input.normalize_and_validate()?;
        let cap = self.settings.max_activities;
        let student = self
            .store
            .update(move |data| {
                if data.student_by_code(&input.student_id).is_some() {
                    return Err(ServiceError::Conflict("student ID already exists".into()));
                }
                if data.class_by_name(&input.class_name).is_none() {
                    return Err(ServiceError::Validation(format!("class `{}` does not exist", input.class_name)));
                }
                let student = data.students.insert_with(|id| input.into_student(id)).clone();
                data.log_activity(
                    ActivityKind::Student,
                    format!("New student {} was added to {}.", student.full_name(), student.class_name),
                    cap,
                );
                Ok(student)
            })
            .await?;
        info!(student_id = student.id, code = %student.student_id, class = %student.class_name, "student_created");
        Ok(student)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: u64, input: StudentInput) -> Result<Student, ServiceError> {
        let input = input.normalize_and_validate()?;
        let cap = self.settings.max_activities;
        let student = self
            .store
            .update(move |data| {
                if data.students.get(id).is_none() {
                    return Err(ServiceError::not_found("student"));
                }
                if data.student_by_code(&input.student_id).is_some_and(|other| other.id != id) {
                    return Err(ServiceError::Conflict("student ID already exists".into()));
                }
                if data.class_by_name(&input.class_name).is_none() {
                    return Err(ServiceError::Validation(format!("class `{}` does not exist", input.class_name)));
                }
                let student = data.students.get_mut(id).ok_or_else(|| ServiceError::not_found("student"))?;
                input.apply_to(student);
                let student = student.clone();
                data.log_activity(
                    ActivityKind::Student,
                    format!("Student {} details were updated.", student.full_name()),
                    cap,
                );
                Ok(student)
            })
            .await?;
        info!(student_id = student.id, "student_updated");
        Ok(student)
    }

    /// Remove a student and every attendance record that belongs to them.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        let cap = self.settings.max_activities;
        let removed_records = self
            .store
            .update(move |data| {
                let student = data.students.remove(id).ok_or_else(|| ServiceError::not_found("student"))?;
                let before = data.attendance.len();
                data.attendance.retain(|r| r.student_id != id);
                data.log_activity(
                    ActivityKind::Student,
                    format!("Student {} was removed.", student.full_name()),
                    cap,
                );
                Ok(before - data.attendance.len())
            })
            .await?;
        info!(student_id = id, removed_records, "student_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_student, services};

    #[tokio::test]
    async fn create_rejects_duplicate_code_and_unknown_class() {
        let svc = services().await;
        let created = svc.students.create(sample_student("ST-1001", "Class 10-A")).await.unwrap();
        assert_eq!(created.id, 1);

        let dup = svc.students.create(sample_student("ST-1001", "Class 10-B")).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        let no_class = svc.students.create(sample_student("ST-2000", "Class 99")).await;
        assert!(matches!(no_class, Err(ServiceError::Validation(_))));

        let invalid = svc.students.create(sample_student("S", "Class 10-A")).await;
        assert!(matches!(invalid, Err(ServiceError::Model(_))));
    }

    #[tokio::test]
    async fn update_allows_keeping_own_code_but_not_taking_another() {
        let svc = services().await;
        let a = svc.students.create(sample_student("ST-1001", "Class 10-A")).await.unwrap();
        svc.students.create(sample_student("ST-1002", "Class 10-A")).await.unwrap();

        let mut same = sample_student("ST-1001", "Class 11-A");
        same.first_name = "Grace".into();
        let updated = svc.students.update(a.id, same).await.unwrap();
        assert_eq!(updated.first_name, "Grace");
        assert_eq!(updated.class_name, "Class 11-A");

        let taken = svc.students.update(a.id, sample_student("ST-1002", "Class 10-A")).await;
        assert!(matches!(taken, Err(ServiceError::Conflict(_))));

        let missing = svc.students.update(999, sample_student("ST-9", "Class 10-A")).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_filters_by_class_and_active() {
        let svc = services().await;
        svc.students.create(sample_student("ST-1001", "Class 10-A")).await.unwrap();
        let mut inactive = sample_student("ST-1002", "Class 10-B");
        inactive.active = Some(false);
        svc.students.create(inactive).await.unwrap();

        let all = svc.students.list(&StudentFilter::default()).await;
        assert_eq!(all.len(), 2);

        let class_a = StudentFilter { class_name: Some("Class 10-A".into()), ..Default::default() };
        assert_eq!(svc.students.list(&class_a).await.len(), 1);

        let inactive_only = StudentFilter { active: Some(false), ..Default::default() };
        let found = svc.students.list(&inactive_only).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].student_id, "ST-1002");

        assert!(svc.students.get_by_code("ST-1002").await.is_some());
    }

    #[tokio::test]
    async fn delete_cascades_attendance_and_logs_activity() {
        let svc = services().await;
        let s = svc.students.create(sample_student("ST-1001", "Class 10-A")).await.unwrap();
        svc.attendance
            .create(crate::test_support::mark(s.id, "2024-03-04", "present"))
            .await
            .unwrap();

        svc.students.delete(s.id).await.unwrap();
        assert!(svc.students.get(s.id).await.is_none());
        assert!(svc.attendance.for_student(s.id).await.is_empty());
        assert!(matches!(svc.students.delete(s.id).await, Err(ServiceError::NotFound(_))));

        let feed = svc.activities.list(Some(1)).await;
        assert!(feed[0].message.contains("was removed"));
    }
}

use tracing::{info, instrument};

use models::{ActivityKind, Class, ClassInput};

use crate::errors::ServiceError;
use crate::school::{SchoolStore, Settings};

/// Classes created on first start when the store holds none.
pub const DEFAULT_CLASSES: [(&str, &str); 5] = [
    ("Class 10-A", "Secondary School - Section A"),
    ("Class 10-B", "Secondary School - Section B"),
    ("Class 11-A", "Higher Secondary - Section A"),
    ("Class 11-B", "Higher Secondary - Section B"),
    ("Class 12-A", "Higher Secondary - Final Year"),
];

/// Students reference their class by name, so renames are pushed down to
/// them and a class cannot be deleted while it still has students.
#[derive(Clone)]
pub struct ClassService {
    store: SchoolStore,
    settings: Settings,
}

impl ClassService {
    pub fn new(store: SchoolStore, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub async fn list(&self) -> Vec<Class> {
        self.store.read(|data| data.classes.values().cloned().collect()).await
    }

    pub async fn get(&self, id: u64) -> Option<Class> {
        self.store.read(|data| data.classes.get(id).cloned()).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ClassInput) -> Result<Class, ServiceError> {
        let input = input.normalize_and_validate()?;
        let cap = self.settings.max_activities;
        let class = self
            .store
            .update(move |data| {
                if data.class_by_name(&input.name).is_some() {
                    return Err(ServiceError::Conflict(format!("class `{}` already exists", input.name)));
                }
                let class = data.classes.insert_with(|id| input.into_class(id)).clone();
                data.log_activity(ActivityKind::Class, format!("New class {} was created.", class.name), cap);
                Ok(class)
            })
            .await?;
        info!(class_id = class.id, name = %class.name, "class_created");
        Ok(class)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: u64, input: ClassInput) -> Result<Class, ServiceError> {
        let input = input.normalize_and_validate()?;
        let cap = self.settings.max_activities;
        let (class, moved) = self
            .store
            .update(move |data| {
                let old_name = data
                    .classes
                    .get(id)
                    .map(|c| c.name.clone())
                    .ok_or_else(|| ServiceError::not_found("class"))?;
                if data.class_by_name(&input.name).is_some_and(|other| other.id != id) {
                    return Err(ServiceError::Conflict(format!("class `{}` already exists", input.name)));
                }

                let mut moved = 0usize;
                if old_name != input.name {
                    for s in data.students.values_mut().filter(|s| s.class_name == old_name) {
                        s.class_name = input.name.clone();
                        moved += 1;
                    }
                }
                let class = input.into_class(id);
                if let Some(slot) = data.classes.get_mut(id) {
                    *slot = class.clone();
                }
                data.log_activity(ActivityKind::Class, format!("Class {} was updated.", class.name), cap);
                Ok((class, moved))
            })
            .await?;
        info!(class_id = id, name = %class.name, students_moved = moved, "class_updated");
        Ok(class)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        let cap = self.settings.max_activities;
        self.store
            .update(move |data| {
                let name = data
                    .classes
                    .get(id)
                    .map(|c| c.name.clone())
                    .ok_or_else(|| ServiceError::not_found("class"))?;
                let enrolled = data.students.values().filter(|s| s.class_name == name).count();
                if enrolled > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "class `{name}` still has {enrolled} student(s)"
                    )));
                }
                data.classes.remove(id);
                data.log_activity(ActivityKind::Class, format!("Class {name} was removed."), cap);
                Ok(())
            })
            .await?;
        info!(class_id = id, "class_deleted");
        Ok(())
    }

    /// Create [`DEFAULT_CLASSES`] when no class exists yet. Returns how many
    /// were created.
    pub async fn seed_defaults(&self) -> Result<usize, ServiceError> {
        if !self.store.read(|data| data.classes.is_empty()).await {
            return Ok(0);
        }
        for (name, description) in DEFAULT_CLASSES {
            self.create(ClassInput::new(name, description)).await?;
        }
        info!(count = DEFAULT_CLASSES.len(), "default classes seeded");
        Ok(DEFAULT_CLASSES.len())
    }
}

use models::Activity;

use crate::school::SchoolStore;

/// Read side of the activity feed; entries are written by the other services.
#[derive(Clone)]
pub struct ActivityService {
    store: SchoolStore,
}

impl ActivityService {
    pub fn new(store: SchoolStore) -> Self {
        Self { store }
    }

    /// Newest first, truncated to `limit` when given.
    pub async fn list(&self, limit: Option<usize>) -> Vec<Activity> {
        let mut items: Vec<Activity> = self.store.read(|data| data.activities.values().cloned().collect()).await;
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use crate::classes::DEFAULT_CLASSES;
    use crate::school::Settings;
    use crate::test_support::{sample_student, services, services_with};

    #[tokio::test]
    async fn newest_first_with_limit() {
        let svc = services().await;
        svc.students.create(sample_student("ST-1001", "Class 10-A")).await.unwrap();

        let all = svc.activities.list(None).await;
        assert_eq!(all.len(), DEFAULT_CLASSES.len() + 1);
        assert!(all[0].message.starts_with("New student Ada Lovelace"));
        assert_eq!(all.last().unwrap().message, "New class Class 10-A was created.");

        let two = svc.activities.list(Some(2)).await;
        assert_eq!(two.len(), 2);
        assert_eq!(svc.activities.list(Some(0)).await.len(), 0);
    }

    #[tokio::test]
    async fn feed_is_capped() {
        let svc = services_with(Settings { max_activities: 3, ..Settings::default() }).await;
        svc.students.create(sample_student("ST-1001", "Class 10-A")).await.unwrap();
        let feed = svc.activities.list(None).await;
        assert_eq!(feed.len(), 3);
        assert!(feed[0].message.starts_with("New student"));
    }
}

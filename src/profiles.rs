use crate::error::ProfileError;
use crate::profile_types::{NewProfile, Profile, ProfileFilter};

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// In-memory profile collection, kept in insertion order.
#[derive(Default)]
pub struct ProfileStore {
    profiles: RwLock<Vec<Profile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the demo profiles the browsing view ships with.
    pub fn seeded() -> Self {
        let profiles = demo_profiles()
            .into_iter()
            .filter_map(|p| {
                let name = p.name.clone();
                p.into_profile()
                    .map_err(|e| warn!(error=%e, name=%name, "skipping invalid demo profile"))
                    .ok()
            })
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    pub async fn list(&self, filter: &ProfileFilter) -> Vec<Profile> {
        self.profiles
            .read()
            .await
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<Profile> {
        self.profiles
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn insert(&self, new_profile: NewProfile) -> Result<Profile, ProfileError> {
        let profile = new_profile.into_profile()?;
        info!(profile_id=%profile.id, name=%profile.name, "profile created");
        self.profiles.write().await.push(profile.clone());
        Ok(profile)
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_profile(
    name: &str,
    age: u32,
    gender: &str,
    (caste, sub_caste): (&str, &str),
    location: &str,
    (education, occupation): (&str, &str),
    avatar: &str,
    interests: [&str; 3],
    (phone, email): (&str, &str),
) -> NewProfile {
    NewProfile {
        name: name.to_string(),
        age: Some(age),
        gender: gender.to_string(),
        caste: caste.to_string(),
        sub_caste: sub_caste.to_string(),
        location: location.to_string(),
        education: education.to_string(),
        occupation: occupation.to_string(),
        avatar: format!("https://randomuser.me/api/portraits/{avatar}.jpg"),
        interests: interests.iter().map(|i| i.to_string()).collect(),
        phone: phone.to_string(),
        email: email.to_string(),
    }
}

fn demo_profiles() -> Vec<NewProfile> {
    vec![
        demo_profile(
            "John Doe",
            30,
            "Male",
            ("Brahmin", "Iyer"),
            "New York",
            ("MBA", "Software Engineer"),
            "men/1",
            ["Reading", "Traveling", "Photography"],
            ("+1-234-567-8901", "john.doe@email.com"),
        ),
        demo_profile(
            "Sarah Wilson",
            27,
            "Female",
            ("Kshatriya", "Rajput"),
            "London",
            ("PhD", "Data Scientist"),
            "women/2",
            ["Yoga", "Cooking", "Art"],
            ("+44-789-012-3456", "sarah.w@email.com"),
        ),
        demo_profile(
            "Raj Patel",
            32,
            "Male",
            ("Vaishya", "Agarwal"),
            "Mumbai",
            ("B.Tech", "Business Analyst"),
            "men/3",
            ["Cricket", "Music", "Meditation"],
            ("+91-987-654-3210", "raj.p@email.com"),
        ),
        demo_profile(
            "Priya Sharma",
            28,
            "Female",
            ("Brahmin", "Iyengar"),
            "Bangalore",
            ("M.Tech", "Product Manager"),
            "women/4",
            ["Dancing", "Writing", "Fitness"],
            ("+91-876-543-2109", "priya.s@email.com"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_types::AgeRange;

    #[tokio::test]
    async fn test_seeded_store() {
        let store = ProfileStore::seeded();
        let all = store.list(&ProfileFilter::default()).await;
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["John Doe", "Sarah Wilson", "Raj Patel", "Priya Sharma"]);
        assert_eq!(all[1].avatar, "https://randomuser.me/api/portraits/women/2.jpg");
    }

    #[tokio::test]
    async fn test_filtered_listing() {
        let store = ProfileStore::seeded();

        let brahmins = store
            .list(&ProfileFilter {
                caste: Some("Brahmin".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(brahmins.len(), 2);

        let older = store
            .list(&ProfileFilter {
                age_range: Some(AgeRange { min: 31, max: Some(35) }),
                ..Default::default()
            })
            .await;
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].name, "Raj Patel");

        let none = store
            .list(&ProfileFilter {
                gender: Some("Female".to_string()),
                search: Some("john".to_string()),
                ..Default::default()
            })
            .await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = ProfileStore::new();
        let created = store
            .insert(NewProfile {
                name: "Meera Nair".to_string(),
                age: Some(29),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(created.id).await, Some(created));
        assert_eq!(store.get(Uuid::new_v4()).await, None);

        let rejected = store.insert(NewProfile::default()).await;
        assert!(rejected.is_err());
        assert_eq!(store.len().await, 1);
    }
}

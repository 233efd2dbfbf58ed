use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{Post, User};

#[derive(Clone)]
pub struct UserService {
    users: Arc<RwLock<Vec<User>>>,
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

impl UserService {
    pub fn new() -> Self {
        let users = vec![
            User {
                id: "3f1c2a9e-7b1d-4c55-9a0e-2d6f1b8c4e11".into(),
                posts: vec![Post {
                    id: 1,
                    content: "lorem ipsum dolor".into(),
                }],
            },
            User {
                id: "8a4d6e2b-1c3f-4b7a-9e5d-0f2a6c8b1d33".into(),
                posts: vec![],
            },
        ];
        Self { users: Arc::new(RwLock::new(users)) }
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    pub async fn get_by_post_id(&self, post_id: u64) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.posts.iter().any(|p| p.id == post_id))
            .cloned()
    }

    /// Insert or replace the user stored under `id`.
    pub async fn upsert(&self, id: &str, mut user: User) -> Upserted {
        user.id = id.to_string();
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(existing) => {
                *existing = user;
                Upserted::Updated
            }
            None => {
                users.push(user);
                Upserted::Created
            }
        }
    }
}

impl Default for UserService {
    fn default() -> Self {
        Self::new()
    }
}

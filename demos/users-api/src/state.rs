use crate::services::UserService;

#[derive(Clone, Default)]
pub struct Services {
    pub users: UserService,
}

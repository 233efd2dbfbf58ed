use serde::{Deserialize, Serialize};
use specmint::openapi::{SchemaDefinition, SchemaProvider, SchemaRef};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Assigned from the request path on upsert.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl SchemaProvider for User {
    fn schema_name() -> &'static str {
        "User"
    }

    fn schema() -> SchemaDefinition {
        SchemaDefinition::object()
            .property("id", SchemaDefinition::string().format("uuid").read_only())
            .property("posts", SchemaDefinition::array(SchemaRef::named("#/components/schemas/Post")))
    }
}

#[derive(Debug, Deserialize)]
pub struct PostIdQuery {
    pub post_id: u64,
}

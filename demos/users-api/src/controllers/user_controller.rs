use crate::models::{PostIdQuery, User};
use crate::services::Upserted;
use crate::state::Services;
use specmint::prelude::*;

pub struct UsersController;

async fn get_users(State(services): State<Services>) -> Json<Vec<User>> {
    Json(services.users.list().await)
}

async fn get_user_by_id(
    State(services): State<Services>,
    Path(id): Path<String>,
) -> Result<Json<User>, HttpError> {
    services
        .users
        .get_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| HttpError::NotFound(format!("user {id}")))
}

async fn upsert_user(
    State(services): State<Services>,
    Path(id): Path<String>,
    Json(mut user): Json<User>,
) -> (StatusCode, Json<User>) {
    user.id = id.clone();
    let status = match services.users.upsert(&id, user.clone()).await {
        Upserted::Created => StatusCode::CREATED,
        Upserted::Updated => StatusCode::OK,
    };
    tracing::info!(user = %id, status = status.as_u16(), "User upserted");
    (status, Json(user))
}

async fn get_user_by_post_id(
    State(services): State<Services>,
    Query(query): Query<PostIdQuery>,
) -> Result<Json<User>, HttpError> {
    services
        .users
        .get_by_post_id(query.post_id)
        .await
        .map(Json)
        .ok_or_else(|| HttpError::NotFound(format!("no user wrote post {}", query.post_id)))
}

impl Controller<Services> for UsersController {
    fn base_path() -> &'static str {
        "/users"
    }

    fn routes(routes: Routes<Services>) -> Routes<Services> {
        routes
            .get("/", "getUsers", get_users)
            .get("/:id", "getUserById", get_user_by_id)
            .put("/:id", "upsertUser", upsert_user)
            .get("/get_by_post_id", "getUserByPostId", get_user_by_post_id)
    }
}

impl Documented for UsersController {
    fn document(doc: ControllerDoc<'_>) -> ControllerDoc<'_> {
        doc.operation(
            "getUsers",
            OperationFragment::new()
                .summary("this endpoint gets a list of users")
                .parameters([ParameterSpec::query("id"), ParameterSpec::query("created_after")]),
        )
        // One status declared twice: the description first, then the content.
        .operation(
            "getUsers",
            OperationFragment::new().response(200, ResponseSpec::described("Successful response")),
        )
        .operation(
            "getUsers",
            OperationFragment::new().response(
                200,
                ResponseSpec::new().content(
                    "application/json",
                    MediaTypeSpec::schema(SchemaRef::named("#/components/schemas/User")),
                ),
            ),
        )
        // All responses at once.
        .operation(
            "getUserById",
            OperationFragment::new()
                .parameter(ParameterSpec::path("id").required())
                .responses([
                    (200, ResponseSpec::described("successful response").content(
                        "application/json",
                        MediaTypeSpec::schema(SchemaRef::named("#/components/schemas/User")),
                    )),
                    (404, ResponseSpec::described("user not found")),
                ]),
        )
        // Custom tags replace the default one.
        .operation(
            "upsertUser",
            OperationFragment::new()
                .parameter(ParameterSpec::path("id").required())
                .request_body(RequestBodySpec::json(SchemaRef::named("#/components/schemas/User")))
                .responses([
                    (200, ResponseSpec::described("successful response").content(
                        "application/json",
                        MediaTypeSpec::schema(SchemaRef::named("#/components/schemas/User")),
                    )),
                    (400, ResponseSpec::described("bad request")),
                ])
                .tags(["users", "upsert functions"]),
        )
        .operation(
            "getUserByPostId",
            OperationFragment::new()
                .parameter(ParameterSpec::query("post_id").required())
                .deprecated(),
        )
    }
}

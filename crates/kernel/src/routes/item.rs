//! Item listing, detail, and comment route handlers.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::cookie::{cookie_value, set_cookie};
use crate::error::{AppError, AppResult};
use crate::models::{Comment, Item, User};
use crate::pager::paginate;
use crate::permissions::{EditRequest, is_editable};
use crate::request::RequestInfo;
use crate::session::current_user_id;
use crate::spam::{self, SubmittedForm};
use crate::state::AppState;
use crate::theme::render;

/// Cookie remembering the last name a visitor commented under.
pub const COMMENT_NAME_COOKIE: &str = "comment_name";

/// Query parameters for the item listing.
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Raw page value; anything unparseable selects the first page.
    pub page: Option<String>,
}

/// An item plus whether the viewer may edit it inline.
#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    item: &'a Item,
    editable: bool,
}

/// Create the item router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items))
        .route("/items/{id}", get(view_item))
        .route("/items/{id}/comments", post(post_comment))
}

async fn current_user(state: &AppState, session: &Session) -> User {
    state.users().current(current_user_id(session).await)
}

/// GET /items - paginated item listing.
async fn list_items(
    State(state): State<AppState>,
    request: RequestInfo,
    session: Session,
    Query(query): Query<ListItemsQuery>,
) -> AppResult<Response> {
    let config = state.config();
    let user = current_user(&state, &session).await;
    let edit = EditRequest::new(&user, config.site_id, state.site_permissions());

    let page = paginate(
        state.items().items(),
        query.page.as_deref().unwrap_or_default(),
        config.items_per_page,
        config.max_paging_links,
    )?;

    let rows: Vec<ItemRow<'_>> = page
        .object_list
        .iter()
        .map(|item| ItemRow {
            item,
            editable: is_editable(item, &edit),
        })
        .collect();

    let mut context = tera::Context::new();
    context.insert("title", "Items");
    context.insert("page", &page);
    context.insert("rows", &rows);

    render(&request, &["items/list.html"], Some(context), None).render(state.theme())
}

/// GET /items/{id} - item detail with comments.
async fn view_item(
    State(state): State<AppState>,
    request: RequestInfo,
    session: Session,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let context = detail_context(&state, &session, id, &headers).await?;
    render(&request, &["items/detail.html"], Some(context), None).render(state.theme())
}

/// POST /items/{id}/comments - submit a comment.
async fn post_comment(
    State(state): State<AppState>,
    request: RequestInfo,
    session: Session,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    if state.items().find_by_id(id).is_none() {
        return Err(AppError::NotFound);
    }

    let form: SubmittedForm = fields.into_iter().collect();
    let url = format!("{}/items/{id}", state.config().site_url);

    let rejection = if spam::is_spam(state.request_filters(), &request, &form, &url).await {
        Some("Your comment was flagged as spam and has not been posted.")
    } else if form.get("body").is_none_or(|b| b.trim().is_empty()) {
        Some("Please enter a comment.")
    } else {
        None
    };

    if let Some(error) = rejection {
        let mut context = detail_context(&state, &session, id, &headers).await?;
        context.insert("error", error);
        context.insert("name_value", form.get("name").unwrap_or_default());
        context.insert("body_value", form.get("body").unwrap_or_default());
        return render(&request, &["items/detail.html"], Some(context), None)
            .with_status(StatusCode::BAD_REQUEST)
            .render(state.theme());
    }

    let name = form
        .get("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Anonymous")
        .to_string();
    let body = form.get("body").unwrap_or_default().trim().to_string();

    state.items().add_comment(
        id,
        Comment {
            name: name.clone(),
            body,
            created: chrono::Utc::now().timestamp(),
        },
    );
    info!(item_id = %id, ip = %request.ip, "comment posted");

    let mut response = Redirect::to(&format!("/items/{id}")).into_response();
    set_cookie(
        response.headers_mut(),
        COMMENT_NAME_COOKIE,
        &name,
        None,
        state.config().cookie_secure,
    )?;
    Ok(response)
}

async fn detail_context(
    state: &AppState,
    session: &Session,
    id: Uuid,
    headers: &HeaderMap,
) -> AppResult<tera::Context> {
    let item = state.items().find_by_id(id).ok_or(AppError::NotFound)?;
    let user = current_user(state, session).await;
    let edit = EditRequest::new(&user, state.config().site_id, state.site_permissions());

    let mut context = tera::Context::new();
    context.insert("title", &item.title);
    context.insert("item", item);
    context.insert("editable", &is_editable(item, &edit));
    context.insert("comments", &state.items().comments(id));
    context.insert("error", &None::<&str>);
    context.insert(
        "name_value",
        &cookie_value(headers, COMMENT_NAME_COOKIE).unwrap_or_default(),
    );
    context.insert("body_value", "");
    Ok(context)
}

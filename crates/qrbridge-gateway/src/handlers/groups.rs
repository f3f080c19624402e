use crate::error::{AppError, Result};
use crate::model::{CreateGroupRequest, FolderQuery, FolderResponse};
use crate::state::AppState;
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::Json;
use qrbridge_admin::{CreateGroupParams, GroupImage};
use qrbridge_core::{Group, Repository, Upload};

pub async fn list_groups_handler<R: Repository>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<Group>>> {
    Ok(Json(state.console().groups().await?))
}

/// Creates a group from either a multipart form (`name` plus an optional
/// `file`) or a JSON body (`name` plus an optional `image_url`).
pub async fn create_group_handler<R: Repository>(
    State(state): State<AppState<R>>,
    request: Request,
) -> Result<(StatusCode, Json<Group>)> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let params = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        group_params_from_form(multipart).await?
    } else {
        let Json(body) = Json::<CreateGroupRequest>::from_request(request, &state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        CreateGroupParams {
            name: body.name,
            image: body.image_url.map(GroupImage::Url).unwrap_or_default(),
        }
    };

    let group = state.console().create_group(params).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn group_params_from_form(mut multipart: Multipart) -> Result<CreateGroupParams> {
    let mut name = None;
    let mut image = GroupImage::None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("name") => name = Some(field.text().await?),
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    image = GroupImage::Upload(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| AppError::BadRequest("a `name` part is required".to_string()))?;
    Ok(CreateGroupParams { name, image })
}

pub async fn delete_group_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    state.console().delete_group(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn folders_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<Vec<FolderResponse>>> {
    let folders = state.console().folders(query.search.as_deref()).await?;
    Ok(Json(
        folders
            .into_iter()
            .map(|f| FolderResponse::new(f, state.domain()))
            .collect(),
    ))
}

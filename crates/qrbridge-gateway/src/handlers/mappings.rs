use crate::error::{AppError, Result};
use crate::model::{CreateMappingRequest, MappingQuery, MappingResponse, UpdateMappingRequest};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use qrbridge_admin::{CreateMappingParams, GroupFilter, MappingFilter, UpdateMappingParams};
use qrbridge_core::{MappingId, RandomLink, Repository};

pub async fn list_mappings_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Query(query): Query<MappingQuery>,
) -> Result<Json<Vec<MappingResponse>>> {
    let filter = MappingFilter {
        search: query.search,
        group: GroupFilter::parse(query.group.as_deref()),
    };
    let mappings = state.console().table(&filter).await?;

    Ok(Json(
        mappings
            .into_iter()
            .map(|m| MappingResponse::new(m, state.domain()))
            .collect(),
    ))
}

pub async fn create_mapping_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Json(request): Json<CreateMappingRequest>,
) -> Result<(StatusCode, Json<MappingResponse>)> {
    let random_link = request.random_link.map(RandomLink::new).transpose()?;
    let mapping = state
        .console()
        .create_mapping(CreateMappingParams {
            website_link: request.website_link,
            group_name: request.group_name,
            random_link,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MappingResponse::new(mapping, state.domain())),
    ))
}

pub async fn get_mapping_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Json<MappingResponse>> {
    let mapping = state
        .console()
        .service()
        .get_mapping(MappingId::new(id))
        .await?;
    Ok(Json(MappingResponse::new(mapping, state.domain())))
}

pub async fn update_mapping_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMappingRequest>,
) -> Result<Json<MappingResponse>> {
    let id = MappingId::new(id);
    let params = UpdateMappingParams {
        website_link: request.website_link,
        group_name: request.group_name,
    };
    if params.is_empty() {
        return Err(AppError::BadRequest(
            "nothing to update: set `website_link` or `group_name`".to_string(),
        ));
    }

    state.console().update_mapping(id, params).await?;

    let mapping = state.console().service().get_mapping(id).await?;
    Ok(Json(MappingResponse::new(mapping, state.domain())))
}

pub async fn delete_mapping_handler<R: Repository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.console().delete_mapping(MappingId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

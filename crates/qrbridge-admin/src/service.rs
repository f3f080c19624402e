use crate::error::{AdminError, Result};
use crate::params::{
    CreateGroupParams, CreateMappingParams, GroupDeletion, GroupImage, UpdateMappingParams,
};
use qrbridge_core::url::validate_website_link;
use qrbridge_core::{
    Group, Mapping, MappingId, NewMapping, ObjectStore, RandomLink, Repository, StorageError,
};
use qrbridge_generator::Generator;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct AdminSettings {
    /// How many generated links to try before giving up on a conflict.
    #[builder(default = 5)]
    pub max_link_attempts: usize,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The admin data layer.
///
/// Every operation is a direct store call without local state; callers that
/// keep lists around re-fetch after a successful mutation (see
/// [`AdminConsole`](crate::AdminConsole)). Nothing is retried except a
/// generated random link that collides with an existing row.
pub struct AdminService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    object_store: Arc<dyn ObjectStore>,
    settings: AdminSettings,
}

impl<R, G> Clone for AdminService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            object_store: Arc::clone(&self.object_store),
            settings: self.settings.clone(),
        }
    }
}

impl<R, G> fmt::Debug for AdminService<R, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<R: Repository, G: Generator> AdminService<R, G> {
    pub fn new(
        repository: Arc<R>,
        generator: G,
        object_store: Arc<dyn ObjectStore>,
        settings: AdminSettings,
    ) -> Self {
        Self {
            repository,
            generator: Arc::new(generator),
            object_store,
            settings,
        }
    }

    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.object_store
    }

    /// Lists all mappings, newest first.
    pub async fn list_mappings(&self) -> Result<Vec<Mapping>> {
        Ok(self.repository.list_mappings().await?)
    }

    /// Lists all groups ordered by name.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.repository.list_groups().await?)
    }

    pub async fn get_mapping(&self, id: MappingId) -> Result<Mapping> {
        self.repository
            .get_mapping(id)
            .await?
            .ok_or(AdminError::MappingNotFound(id))
    }

    pub async fn get_group(&self, name: &str) -> Result<Group> {
        self.repository
            .get_group(name)
            .await?
            .ok_or_else(|| AdminError::GroupNotFound(name.to_string()))
    }

    /// Creates a mapping.
    ///
    /// A caller-supplied link that is already taken is reported as
    /// [`AdminError::Conflict`]. A generated link that collides is replaced by
    /// a fresh one, up to [`AdminSettings::max_link_attempts`] times.
    pub async fn create_mapping(&self, params: CreateMappingParams) -> Result<Mapping> {
        validate_website_link(&params.website_link)?;
        let group_name = self.existing_group(params.group_name.as_deref()).await?;

        if let Some(random_link) = params.random_link {
            let mapping = self
                .repository
                .insert_mapping(NewMapping {
                    random_link,
                    website_link: params.website_link,
                    group_name,
                })
                .await?;
            info!(id = %mapping.id, random_link = %mapping.random_link, "created mapping");
            return Ok(mapping);
        }

        let attempts = self.settings.max_link_attempts.max(1);
        for attempt in 1..=attempts {
            let random_link: RandomLink = self.generator.generate().into();
            let result = self
                .repository
                .insert_mapping(NewMapping {
                    random_link: random_link.clone(),
                    website_link: params.website_link.clone(),
                    group_name: group_name.clone(),
                })
                .await;

            match result {
                Ok(mapping) => {
                    info!(id = %mapping.id, random_link = %mapping.random_link, "created mapping");
                    return Ok(mapping);
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(random_link = %random_link, attempt, "generated random link already taken");
                }
                Err(e) => {
                    error!(error = %e, "failed to create mapping");
                    return Err(e.into());
                }
            }
        }

        Err(AdminError::LinksExhausted(attempts))
    }

    /// Points a mapping at a new destination.
    pub async fn update_destination(&self, id: MappingId, website_link: &str) -> Result<()> {
        validate_website_link(website_link)?;
        if !self.repository.update_destination(id, website_link).await? {
            return Err(AdminError::MappingNotFound(id));
        }
        info!(id = %id, "updated mapping destination");
        Ok(())
    }

    /// Moves a mapping into another group, or out of any group with `None`.
    pub async fn update_group(&self, id: MappingId, group_name: Option<&str>) -> Result<()> {
        let group_name = self.existing_group(group_name).await?;
        if !self
            .repository
            .update_group(id, group_name.as_deref())
            .await?
        {
            return Err(AdminError::MappingNotFound(id));
        }
        info!(id = %id, group = ?group_name, "updated mapping group");
        Ok(())
    }

    /// Applies a partial update. Both fields are validated before anything is
    /// written, so a rejected update leaves the mapping as it was.
    pub async fn update_mapping(&self, id: MappingId, params: UpdateMappingParams) -> Result<()> {
        if let Some(website_link) = &params.website_link {
            validate_website_link(website_link)?;
        }
        let group_name = match &params.group_name {
            Some(group_name) => Some(self.existing_group(group_name.as_deref()).await?),
            None => None,
        };

        if let Some(website_link) = &params.website_link {
            if !self.repository.update_destination(id, website_link).await? {
                return Err(AdminError::MappingNotFound(id));
            }
        }
        if let Some(group_name) = &group_name {
            if !self
                .repository
                .update_group(id, group_name.as_deref())
                .await?
            {
                return Err(AdminError::MappingNotFound(id));
            }
        }
        info!(id = %id, destination = params.website_link.is_some(), group = ?group_name, "updated mapping");
        Ok(())
    }

    pub async fn delete_mapping(&self, id: MappingId) -> Result<()> {
        if !self.repository.delete_mapping(id).await? {
            return Err(AdminError::MappingNotFound(id));
        }
        info!(id = %id, "deleted mapping");
        Ok(())
    }

    /// Creates a group, uploading its image to the object store first when one
    /// is supplied as a file.
    pub async fn create_group(&self, params: CreateGroupParams) -> Result<Group> {
        let name = Group::normalize_name(&params.name)?;
        if self.repository.get_group(&name).await?.is_some() {
            return Err(AdminError::Conflict(name));
        }

        let image_url = match params.image {
            GroupImage::None => None,
            GroupImage::Url(url) => {
                validate_website_link(&url)?;
                Some(url)
            }
            GroupImage::Upload(upload) => {
                let url = self.object_store.put(upload).await.map_err(|e| {
                    error!(group = %name, error = %e, "failed to upload group image");
                    e
                })?;
                debug!(group = %name, url = %url, "uploaded group image");
                Some(url)
            }
        };

        let group = Group { name, image_url };
        self.repository
            .insert_group(group.clone())
            .await
            .map_err(|e| {
                if let Some(url) = &group.image_url {
                    warn!(group = %group.name, url = %url, "group insert failed after image upload");
                }
                e
            })?;
        info!(group = %group.name, "created group");
        Ok(group)
    }

    /// Deletes every mapping of the group, then the group itself.
    ///
    /// The two deletes are not atomic. If the second one fails the result is
    /// [`AdminError::PartialGroupDeletion`]; calling this again completes the
    /// deletion because the first step then removes nothing.
    pub async fn delete_group(&self, name: &str) -> Result<GroupDeletion> {
        let name = Group::normalize_name(name)?;

        let removed_mappings = self
            .repository
            .delete_mappings_in_group(&name)
            .await
            .map_err(|e| {
                error!(group = %name, error = %e, "failed to delete group mappings");
                AdminError::from(e)
            })?;
        debug!(group = %name, removed_mappings, "deleted group mappings");

        match self.repository.delete_group(&name).await {
            Ok(true) => {}
            Ok(false) if removed_mappings == 0 => return Err(AdminError::GroupNotFound(name)),
            Ok(false) => {
                warn!(group = %name, removed_mappings, "removed mappings of a group without a row");
            }
            Err(source) => {
                error!(group = %name, removed_mappings, error = %source, "group row delete failed after its mappings were removed");
                return Err(AdminError::PartialGroupDeletion {
                    group: name,
                    removed_mappings,
                    source,
                });
            }
        }

        info!(group = %name, removed_mappings, "deleted group");
        Ok(GroupDeletion {
            group: name,
            removed_mappings,
        })
    }

    /// Normalizes an optional group reference and checks the group exists.
    async fn existing_group(&self, group_name: Option<&str>) -> Result<Option<String>> {
        let Some(group_name) = group_name else {
            return Ok(None);
        };
        let name = Group::normalize_name(group_name)?;
        if self.repository.get_group(&name).await?.is_none() {
            return Err(AdminError::UnknownGroup(name));
        }
        Ok(Some(name))
    }
}

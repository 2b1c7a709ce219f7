//! Inline editing permission checks.
//!
//! An object is editable from the front end when it says so itself (see
//! [`Editable::editable_by`]), or otherwise when the current user is logged in,
//! may administer the current site, and holds the object's change permission.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::User;

/// Identifies the model an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentMeta {
    pub app_label: &'static str,
    pub model_name: &'static str,
}

impl ContentMeta {
    pub const fn new(app_label: &'static str, model_name: &'static str) -> Self {
        Self {
            app_label,
            model_name,
        }
    }

    /// Permission required to change objects of this model.
    pub fn change_permission(&self) -> String {
        format!("{}.change_{}", self.app_label, self.model_name)
    }
}

/// Content that can be edited inline.
pub trait Editable {
    fn meta(&self) -> ContentMeta;

    /// Custom editability rule. `None` defers to the permission check.
    fn editable_by(&self, _request: &EditRequest<'_>) -> Option<bool> {
        None
    }
}

/// Site ids each user may administer.
#[derive(Debug, Clone, Default)]
pub struct SitePermissions {
    grants: Arc<DashMap<Uuid, HashSet<u32>>>,
}

impl SitePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a user to administer a site.
    pub fn grant(&self, user_id: Uuid, site_id: u32) {
        self.grants.entry(user_id).or_default().insert(site_id);
    }

    pub fn is_granted(&self, user_id: Uuid, site_id: u32) -> bool {
        self.grants
            .get(&user_id)
            .is_some_and(|sites| sites.contains(&site_id))
    }
}

/// What a permission check sees of the current request.
#[derive(Debug, Clone, Copy)]
pub struct EditRequest<'a> {
    pub user: &'a User,
    pub site_id: u32,
    pub site_permissions: &'a SitePermissions,
}

impl<'a> EditRequest<'a> {
    pub fn new(user: &'a User, site_id: u32, site_permissions: &'a SitePermissions) -> Self {
        Self {
            user,
            site_id,
            site_permissions,
        }
    }
}

/// Check whether a user may administer a site.
///
/// Active admins may administer every site; active staff only the sites
/// they've been granted.
pub fn has_site_permission(user: &User, site_id: u32, grants: &SitePermissions) -> bool {
    if !user.is_active() {
        return false;
    }
    user.is_admin || (user.is_staff && grants.is_granted(user.id, site_id))
}

/// Check whether `obj` may be edited inline for this request.
pub fn is_editable<E: Editable + ?Sized>(obj: &E, request: &EditRequest<'_>) -> bool {
    if let Some(editable) = obj.editable_by(request) {
        return editable;
    }

    let permission = obj.meta().change_permission();
    let user = request.user;
    user.is_authenticated()
        && has_site_permission(user, request.site_id, request.site_permissions)
        && user.has_perm(&permission)
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visibility and management decisions for tasks, announcements and documentation items.
//!
//! Every decision is a pure function of the principal, the target and a [`Snapshot`] of domain
//! records plus the current time. The resolver holds no state besides its configuration and
//! never performs I/O, so callers re-run it whenever any input changes.
//!
//! Rules are evaluated per feature and the first applicable rule wins:
//!
//! | Target        | View                                                   | Manage                      |
//! |---------------|--------------------------------------------------------|-----------------------------|
//! | Task          | admins; assignees; leads of the task domain           | super-admin, admin, leads   |
//! | Announcement  | admins; author; published + live + selector match      | admins, authoring lead      |
//! | Documentation | super-admin; selector match                            | super-admin, curating leads |
//!
//! Anything not explicitly allowed is denied.
use tracing::{debug, trace};

use crate::access::{Access, Decision, Reason};
use crate::config::ResolverConfig;
use crate::domain::Membership;
use crate::principal::Principal;
use crate::role::Role;
use crate::selector::{Selector, SelectorList, Subrole};
use crate::target::{Announcement, DocumentationItem, Target, Task, TaskStatus, Timestamp};
use crate::traits::DomainDirectory;

/// Consistent view of the inputs a decision depends on besides principal and target.
#[derive(Debug)]
pub struct Snapshot<'a, D> {
    /// All domain records known at the time of the decision.
    pub domains: &'a D,

    /// Time used for the publication gate of announcements.
    pub now: Timestamp,
}

impl<'a, D> Snapshot<'a, D> {
    pub fn new(domains: &'a D, now: Timestamp) -> Self {
        Self { domains, now }
    }
}

impl<D> Clone for Snapshot<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Snapshot<'_, D> {}

/// Decides whether principals may view or manage targets.
#[derive(Clone, Debug, Default)]
pub struct AccessResolver {
    config: ResolverConfig,
}

impl AccessResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns `true` if the principal may see the target.
    pub fn can_view<'t, D>(
        &self,
        principal: Option<&Principal>,
        target: impl Into<Target<'t>>,
        snapshot: &Snapshot<'_, D>,
    ) -> bool
    where
        D: DomainDirectory,
    {
        self.explain(Access::View, principal, target.into(), snapshot)
            .is_allowed()
    }

    /// Returns `true` if the principal may edit or delete the target.
    pub fn can_manage<'t, D>(
        &self,
        principal: Option<&Principal>,
        target: impl Into<Target<'t>>,
        snapshot: &Snapshot<'_, D>,
    ) -> bool
    where
        D: DomainDirectory,
    {
        self.explain(Access::Manage, principal, target.into(), snapshot)
            .is_allowed()
    }

    /// Decide on view access and report the rule which applied.
    pub fn explain_view<'t, D>(
        &self,
        principal: Option<&Principal>,
        target: impl Into<Target<'t>>,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        self.explain(Access::View, principal, target.into(), snapshot)
    }

    /// Decide on manage access and report the rule which applied.
    pub fn explain_manage<'t, D>(
        &self,
        principal: Option<&Principal>,
        target: impl Into<Target<'t>>,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        self.explain(Access::Manage, principal, target.into(), snapshot)
    }

    /// Decide on the given kind of access.
    pub fn explain<D>(
        &self,
        access: Access,
        principal: Option<&Principal>,
        target: Target<'_>,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        let Some(principal) = principal else {
            trace!(item = target.id(), kind = target.kind(), %access, "no principal");
            return Decision::Denied(Reason::NoPrincipal);
        };

        let decision = match (access, target) {
            (Access::View, Target::Task(task)) => self.view_task(principal, task, snapshot),
            (Access::View, Target::Announcement(announcement)) => {
                self.view_announcement(principal, announcement, snapshot)
            }
            (Access::View, Target::Documentation(item)) => {
                self.view_documentation(principal, item, snapshot)
            }
            (Access::Manage, Target::Task(task)) => self.manage_task(principal, task, snapshot),
            (Access::Manage, Target::Announcement(announcement)) => {
                self.manage_announcement(principal, announcement)
            }
            (Access::Manage, Target::Documentation(_)) => {
                self.manage_documentation(principal, snapshot)
            }
        };

        debug!(
            principal = %principal.id,
            item = target.id(),
            kind = target.kind(),
            %access,
            %decision,
            "resolved access"
        );

        decision
    }

    /// Returns `true` if the principal may create a task in the given domain.
    pub fn can_create_task<D>(
        &self,
        principal: Option<&Principal>,
        domain: &str,
        snapshot: &Snapshot<'_, D>,
    ) -> bool
    where
        D: DomainDirectory,
    {
        self.explain_create_task(principal, domain, snapshot)
            .is_allowed()
    }

    /// Decide whether the principal may create a task in the given domain.
    pub fn explain_create_task<D>(
        &self,
        principal: Option<&Principal>,
        domain: &str,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        let Some(principal) = principal else {
            return Decision::Denied(Reason::NoPrincipal);
        };

        match principal.effective_role() {
            Role::SuperAdmin => Decision::Allowed(Reason::AdminOverride(Role::SuperAdmin)),
            Role::Admin if self.config.admins_create_tasks => {
                Decision::Allowed(Reason::AdminOverride(Role::Admin))
            }
            Role::Admin => Decision::Denied(Reason::RoleNotPermitted(principal.role)),
            Role::DomainLead => {
                if self.membership(snapshot).is_lead(principal, domain) {
                    Decision::Allowed(Reason::LeadsDomain(domain.to_string()))
                } else {
                    Decision::Denied(Reason::OutsideDomain)
                }
            }
            Role::Member => Decision::Denied(Reason::RoleNotPermitted(principal.role)),
        }
    }

    /// Returns `true` if the principal may write new announcements.
    pub fn can_create_announcement(&self, principal: Option<&Principal>) -> bool {
        principal.is_some_and(|principal| {
            matches!(
                principal.effective_role(),
                Role::SuperAdmin | Role::Admin | Role::DomainLead
            )
        })
    }

    /// Returns `true` if the selector matches the principal.
    ///
    /// Domain selectors only match domains which have a record in the snapshot.
    pub fn matches<D>(
        &self,
        principal: &Principal,
        selector: &Selector,
        snapshot: &Snapshot<'_, D>,
    ) -> bool
    where
        D: DomainDirectory,
    {
        let membership = self.membership(snapshot);

        match selector {
            Selector::All => true,
            Selector::Role(role) => principal.has_role(*role),
            Selector::Email(email) => principal.has_email(email),
            Selector::Domain(domain) => {
                snapshot.domains.record(domain).is_some()
                    && membership.belongs_to(principal, domain)
            }
            Selector::DomainRole { domain, subrole } => {
                snapshot.domains.record(domain).is_some()
                    && match subrole {
                        Subrole::Lead => membership.is_lead(principal, domain),
                        Subrole::Member => membership.is_member(principal, domain),
                    }
            }
        }
    }

    /// First selector of the list matching the principal. `all` always wins.
    pub fn matching_selector<'s, D>(
        &self,
        principal: &Principal,
        selectors: &'s SelectorList,
        snapshot: &Snapshot<'_, D>,
    ) -> Option<&'s Selector>
    where
        D: DomainDirectory,
    {
        if let Some(all) = selectors.iter().find(|selector| selector.is_all()) {
            return Some(all);
        }

        selectors
            .iter()
            .find(|selector| self.matches(principal, selector, snapshot))
    }

    /// Items of a fetched collection the principal may see, in their original order.
    pub fn filter_visible<'i, T, D>(
        &self,
        principal: Option<&Principal>,
        items: impl IntoIterator<Item = &'i T>,
        snapshot: &Snapshot<'_, D>,
    ) -> Vec<&'i T>
    where
        T: 'i,
        &'i T: Into<Target<'i>>,
        D: DomainDirectory,
    {
        items
            .into_iter()
            .filter(|item| self.can_view(principal, *item, snapshot))
            .collect()
    }

    /// Items of a fetched collection the principal may manage, in their original order.
    pub fn filter_manageable<'i, T, D>(
        &self,
        principal: Option<&Principal>,
        items: impl IntoIterator<Item = &'i T>,
        snapshot: &Snapshot<'_, D>,
    ) -> Vec<&'i T>
    where
        T: 'i,
        &'i T: Into<Target<'i>>,
        D: DomainDirectory,
    {
        items
            .into_iter()
            .filter(|item| self.can_manage(principal, *item, snapshot))
            .collect()
    }

    /// Visible tasks of a single domain.
    ///
    /// The domain is `scope` if given, otherwise the principal's active domain. Without either
    /// this is [`Self::filter_visible`]. Scoping narrows the result, it never grants access.
    pub fn scoped_tasks<'i, D>(
        &self,
        principal: Option<&Principal>,
        tasks: impl IntoIterator<Item = &'i Task>,
        scope: Option<&str>,
        snapshot: &Snapshot<'_, D>,
    ) -> Vec<&'i Task>
    where
        D: DomainDirectory,
    {
        let scope = scope.or_else(|| principal.and_then(|p| p.active_domain.as_deref()));

        self.filter_visible(principal, tasks, snapshot)
            .into_iter()
            .filter(|task| scope.is_none_or(|domain| task.domain.as_deref() == Some(domain)))
            .collect()
    }

    pub(crate) fn membership<'a, D>(&self, snapshot: &Snapshot<'a, D>) -> Membership<'a, D>
    where
        D: DomainDirectory,
    {
        Membership::new(snapshot.domains, self.config.membership)
    }

    pub(crate) fn view_selectors<D>(
        &self,
        principal: &Principal,
        selectors: &SelectorList,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        if selectors.is_empty() {
            return Decision::Denied(Reason::NoSelectors);
        }

        match self.matching_selector(principal, selectors, snapshot) {
            Some(selector) => Decision::Allowed(Reason::SelectorMatched(selector.clone())),
            None => Decision::Denied(Reason::NoSelectorMatched),
        }
    }

    fn view_task<D>(
        &self,
        principal: &Principal,
        task: &Task,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        let is_assignee = task
            .assignees
            .iter()
            .any(|assignee| assignee.refers_to(principal));

        match principal.effective_role() {
            role @ (Role::SuperAdmin | Role::Admin) => {
                Decision::Allowed(Reason::AdminOverride(role))
            }
            Role::DomainLead if is_assignee => Decision::Allowed(Reason::Assignee),
            Role::DomainLead => {
                let Some(domain) = self.led_task_domain(principal, task, snapshot) else {
                    return Decision::Denied(Reason::OutsideDomain);
                };

                // Leads see work routed to them before handing it out, but not work waiting
                // for another lead of the same domain.
                let routed_here = task
                    .assigned_to_lead
                    .as_ref()
                    .is_some_and(|lead| lead.refers_to(principal));
                if task.status == TaskStatus::Unassigned && !routed_here {
                    return Decision::Denied(Reason::AwaitingAnotherLead);
                }

                Decision::Allowed(Reason::LeadsDomain(domain.to_string()))
            }
            Role::Member if is_assignee => Decision::Allowed(Reason::Assignee),
            Role::Member => Decision::Denied(Reason::NotAssigned),
        }
    }

    fn view_announcement<D>(
        &self,
        principal: &Principal,
        announcement: &Announcement,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        let role = principal.effective_role();
        if role.is_admin() {
            return Decision::Allowed(Reason::AdminOverride(role));
        }

        if is_author(principal, announcement) {
            return Decision::Allowed(Reason::Author);
        }

        if !announcement.is_live(snapshot.now) {
            return match announcement.publish_at {
                Some(at) if announcement.status.is_published() => {
                    Decision::Denied(Reason::Scheduled(at))
                }
                _ => Decision::Denied(Reason::NotPublished),
            };
        }

        self.view_selectors(principal, &announcement.targets, snapshot)
    }

    fn view_documentation<D>(
        &self,
        principal: &Principal,
        item: &DocumentationItem,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        // Only super-admins bypass documentation selectors, admins are matched like anyone else.
        if principal.has_role(Role::SuperAdmin) {
            return Decision::Allowed(Reason::AdminOverride(Role::SuperAdmin));
        }

        self.view_selectors(principal, &item.viewable_by, snapshot)
    }

    fn manage_task<D>(
        &self,
        principal: &Principal,
        task: &Task,
        snapshot: &Snapshot<'_, D>,
    ) -> Decision
    where
        D: DomainDirectory,
    {
        match principal.effective_role() {
            role @ (Role::SuperAdmin | Role::Admin) => {
                Decision::Allowed(Reason::AdminOverride(role))
            }
            Role::DomainLead => match self.led_task_domain(principal, task, snapshot) {
                Some(domain) => Decision::Allowed(Reason::LeadsDomain(domain.to_string())),
                None => Decision::Denied(Reason::OutsideDomain),
            },
            Role::Member => Decision::Denied(Reason::RoleNotPermitted(principal.role)),
        }
    }

    fn manage_announcement(&self, principal: &Principal, announcement: &Announcement) -> Decision {
        match principal.effective_role() {
            role @ (Role::SuperAdmin | Role::Admin) => {
                Decision::Allowed(Reason::AdminOverride(role))
            }
            Role::DomainLead if is_author(principal, announcement) => {
                Decision::Allowed(Reason::Author)
            }
            Role::DomainLead => Decision::Denied(Reason::NotAuthor),
            Role::Member => Decision::Denied(Reason::RoleNotPermitted(principal.role)),
        }
    }

    fn manage_documentation<D>(&self, principal: &Principal, snapshot: &Snapshot<'_, D>) -> Decision
    where
        D: DomainDirectory,
    {
        match principal.effective_role() {
            Role::SuperAdmin => Decision::Allowed(Reason::AdminOverride(Role::SuperAdmin)),
            Role::DomainLead
                if self
                    .membership(snapshot)
                    .is_lead(principal, &self.config.documentation_domain) =>
            {
                Decision::Allowed(Reason::DocumentationCurator)
            }
            Role::Admin | Role::DomainLead | Role::Member => {
                Decision::Denied(Reason::RoleNotPermitted(principal.role))
            }
        }
    }

    /// Domain of the task, if the principal leads it.
    fn led_task_domain<'t, D>(
        &self,
        principal: &Principal,
        task: &'t Task,
        snapshot: &Snapshot<'_, D>,
    ) -> Option<&'t str>
    where
        D: DomainDirectory,
    {
        task.domain
            .as_deref()
            .filter(|domain| self.membership(snapshot).is_lead(principal, domain))
    }
}

fn is_author(principal: &Principal, announcement: &Announcement) -> bool {
    announcement
        .author
        .as_ref()
        .is_some_and(|author| author.refers_to(principal))
}

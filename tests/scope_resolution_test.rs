//! End-to-end scope resolution: identity → visibility filter → row set,
//! interpreted over an in-memory store so no database is needed.

use proptest::prelude::*;
use uuid::Uuid;

use liftops_core::auth::{Identity, Role};
use liftops_core::scopes::{
    customer_visibility, project_visibility, task_visibility, FilterField, VisibilityFilter,
};
use liftops_core::test_helpers::MemoryStore;

/// Two customers, two projects each, tasks spread across technicians.
struct Fixture {
    store: MemoryStore,
    customer_a: Uuid,
    customer_b: Uuid,
    deleted_customer: Uuid,
    project_a1: Uuid,
    project_a2: Uuid,
    project_b1: Uuid,
    task_a1_t1: Uuid,
    task_a2_none: Uuid,
    task_b1_t2: Uuid,
    technician_1: Uuid,
    technician_2: Uuid,
}

fn fixture() -> Fixture {
    let mut store = MemoryStore::new();
    let technician_1 = Uuid::new_v4();
    let technician_2 = Uuid::new_v4();

    let customer_a = store.add_customer(Uuid::new_v4(), false);
    let customer_b = store.add_customer(Uuid::new_v4(), false);
    let deleted_customer = store.add_customer(Uuid::new_v4(), true);

    let project_a1 = store.add_project(Uuid::new_v4(), customer_a);
    let project_a2 = store.add_project(Uuid::new_v4(), customer_a);
    let project_b1 = store.add_project(Uuid::new_v4(), customer_b);

    let task_a1_t1 = store.add_task(Uuid::new_v4(), project_a1, Some(technician_1));
    let task_a2_none = store.add_task(Uuid::new_v4(), project_a2, None);
    let task_b1_t2 = store.add_task(Uuid::new_v4(), project_b1, Some(technician_2));

    Fixture {
        store,
        customer_a,
        customer_b,
        deleted_customer,
        project_a1,
        project_a2,
        project_b1,
        task_a1_t1,
        task_a2_none,
        task_b1_t2,
        technician_1,
        technician_2,
    }
}

#[test]
fn admin_and_manager_see_all_customers_except_deleted() {
    let f = fixture();
    for role in [Role::Admin, Role::ProjectManager] {
        let identity = Identity::staff(Uuid::new_v4(), role);
        let visible = f.store.find_customers(&customer_visibility(&identity));
        assert!(visible.contains(&f.customer_a));
        assert!(visible.contains(&f.customer_b));
        assert!(!visible.contains(&f.deleted_customer));
    }
}

#[test]
fn admin_sees_every_project_and_task() {
    let f = fixture();
    let admin = Identity::staff(Uuid::new_v4(), Role::Admin);
    assert_eq!(f.store.find_projects(&project_visibility(&admin)).len(), 3);
    assert_eq!(f.store.find_tasks(&task_visibility(&admin)).len(), 3);
}

#[test]
fn customer_sees_exactly_their_own_rows() {
    let f = fixture();
    let caller = Identity::customer(Uuid::new_v4(), f.customer_a);

    let customers = f.store.find_customers(&customer_visibility(&caller));
    assert_eq!(customers, vec![f.customer_a]);

    let mut projects = f.store.find_projects(&project_visibility(&caller));
    projects.sort();
    let mut expected = vec![f.project_a1, f.project_a2];
    expected.sort();
    assert_eq!(projects, expected);

    let mut tasks = f.store.find_tasks(&task_visibility(&caller));
    tasks.sort();
    let mut expected = vec![f.task_a1_t1, f.task_a2_none];
    expected.sort();
    assert_eq!(tasks, expected);
    assert!(!tasks.contains(&f.task_b1_t2));
}

#[test]
fn technician_sees_only_assigned_tasks_and_their_lineage() {
    let f = fixture();
    let caller = Identity::staff(f.technician_1, Role::Technician);

    assert_eq!(
        f.store.find_tasks(&task_visibility(&caller)),
        vec![f.task_a1_t1]
    );
    assert_eq!(
        f.store.find_projects(&project_visibility(&caller)),
        vec![f.project_a1]
    );
    assert_eq!(
        f.store.find_customers(&customer_visibility(&caller)),
        vec![f.customer_a]
    );
}

#[test]
fn technicians_do_not_see_each_others_rows() {
    let f = fixture();
    let caller = Identity::staff(f.technician_2, Role::Technician);

    assert_eq!(
        f.store.find_tasks(&task_visibility(&caller)),
        vec![f.task_b1_t2]
    );
    assert_eq!(
        f.store.find_projects(&project_visibility(&caller)),
        vec![f.project_b1]
    );
    assert_eq!(
        f.store.find_customers(&customer_visibility(&caller)),
        vec![f.customer_b]
    );
}

#[test]
fn technician_with_no_assignments_sees_nothing() {
    let f = fixture();
    let caller = Identity::staff(Uuid::new_v4(), Role::Technician);
    assert!(f.store.find_tasks(&task_visibility(&caller)).is_empty());
    assert!(f.store.find_projects(&project_visibility(&caller)).is_empty());
    assert!(f.store.find_customers(&customer_visibility(&caller)).is_empty());
}

#[test]
fn customer_identity_without_owning_record_sees_zero_rows() {
    let f = fixture();
    let malformed = Identity {
        user_id: Uuid::new_v4(),
        role: Role::Customer,
        customer_id: None,
    };

    assert!(customer_visibility(&malformed).is_never());
    assert!(f.store.find_customers(&customer_visibility(&malformed)).is_empty());
    assert!(f.store.find_projects(&project_visibility(&malformed)).is_empty());
    assert!(f.store.find_tasks(&task_visibility(&malformed)).is_empty());
}

#[test]
fn filters_compose_with_extra_constraints() {
    let f = fixture();
    let caller = Identity::customer(Uuid::new_v4(), f.customer_a);

    // Detail lookup: visibility AND id pin, same predicate language.
    let lookup = project_visibility(&caller)
        .and(VisibilityFilter::equals(FilterField::Id, f.project_a2));
    assert_eq!(f.store.find_projects(&lookup), vec![f.project_a2]);

    // Foreign id stays invisible even when pinned explicitly.
    let foreign = project_visibility(&caller)
        .and(VisibilityFilter::equals(FilterField::Id, f.project_b1));
    assert!(f.store.find_projects(&foreign).is_empty());
}

#[test]
fn task_detail_lookup_misses_outside_the_caller_scope() {
    let f = fixture();
    let caller = Identity::staff(f.technician_1, Role::Technician);

    let own = task_visibility(&caller).and(VisibilityFilter::equals(FilterField::Id, f.task_a1_t1));
    assert_eq!(f.store.find_tasks(&own), vec![f.task_a1_t1]);

    // A foreign task id resolves to nothing, indistinguishable from an
    // absent row.
    let foreign =
        task_visibility(&caller).and(VisibilityFilter::equals(FilterField::Id, f.task_b1_t2));
    assert!(f.store.find_tasks(&foreign).is_empty());
}

#[test]
fn counting_uses_the_same_predicate_as_listing() {
    let f = fixture();
    let caller = Identity::customer(Uuid::new_v4(), f.customer_a);
    let filter = project_visibility(&caller);
    assert_eq!(f.store.count_projects(&filter), f.store.find_projects(&filter).len());
}

fn arbitrary_identity() -> impl Strategy<Value = Identity> {
    (
        prop_oneof![
            Just(Role::Admin),
            Just(Role::ProjectManager),
            Just(Role::Technician),
            Just(Role::Customer),
        ],
        any::<u128>(),
        proptest::option::of(any::<u128>()),
    )
        .prop_map(|(role, user, customer)| Identity {
            user_id: Uuid::from_u128(user),
            role,
            customer_id: customer.map(Uuid::from_u128),
        })
}

proptest! {
    /// Resolution is a pure function of the identity.
    #[test]
    fn resolution_is_deterministic(identity in arbitrary_identity()) {
        prop_assert_eq!(customer_visibility(&identity), customer_visibility(&identity));
        prop_assert_eq!(project_visibility(&identity), project_visibility(&identity));
        prop_assert_eq!(task_visibility(&identity), task_visibility(&identity));
    }

    /// No identity ever widens a customer filter past the not-deleted
    /// baseline, and customer-role identities without an owning record
    /// always collapse to zero rows.
    #[test]
    fn customer_filters_never_widen(identity in arbitrary_identity()) {
        let filter = customer_visibility(&identity);
        prop_assert!(!filter.is_all());
        if identity.role == Role::Customer && identity.customer_id.is_none() {
            prop_assert!(filter.is_never());
        }
    }

    /// `All` is the identity of conjunction, `Never` absorbs it, and
    /// conjoining a resolved filter with itself changes nothing.
    #[test]
    fn conjunction_laws_hold_for_resolved_filters(identity in arbitrary_identity()) {
        let filter = project_visibility(&identity);
        prop_assert_eq!(filter.clone().and(VisibilityFilter::All), filter.clone());
        prop_assert_eq!(VisibilityFilter::All.and(filter.clone()), filter.clone());
        prop_assert_eq!(filter.clone().and(filter.clone()), filter.clone());
        prop_assert!(filter.and(VisibilityFilter::Never).is_never());
    }
}

//! Integration tests for drill-down selection and data scoping.

mod common;

use std::sync::Arc;
use std::thread;

use bureau_access::error::SelectionError;
use bureau_access::filter::{ScopeFilter, scope_data, scope_data_by};
use bureau_access::permission::{Action, EffectivePermissions, Permission, PermissionCheck, Scope};
use bureau_access::role::builtin;
use bureau_access::scope::{EffectiveTenant, ScopeSelection, SelectionCell, effective_tenant};
use bureau_access::tenant::{TenantId, TenantType};

use common::{bureau_hierarchy, labels, record_per_tenant, session_with};

const ALL_NODES: [&str; 11] = [
    "bureau", "r1", "z1", "z2", "w1", "w2", "w3", "k1", "s1", "s2", "s3",
];

// ============================================================================
// Selection Tests
// ============================================================================

mod selection {
    use super::*;

    #[test]
    fn test_narrowing_is_downward_only() {
        let hierarchy = bureau_hierarchy();
        let session = session_with(builtin::ZONE_ADMIN, "z1", TenantType::Zone, vec![]);

        let err = ScopeSelection::default()
            .select_woreda(&TenantId::new("w3"), &session, &hierarchy)
            .unwrap_err();
        assert_eq!(
            err,
            SelectionError::OutOfScope {
                tenant_id: TenantId::new("w3"),
                scope_root: TenantId::new("z1"),
            }
        );

        let err = ScopeSelection::default()
            .select_zone(&TenantId::new("z2"), &session, &hierarchy)
            .unwrap_err();
        assert!(matches!(err, SelectionError::OutOfScope { .. }));

        let err = ScopeSelection::default()
            .select_zone(&TenantId::new("r1"), &session, &hierarchy)
            .unwrap_err();
        assert!(matches!(err, SelectionError::WrongLevel { .. }));
    }

    #[test]
    fn test_new_zone_clears_deeper_levels() {
        let hierarchy = bureau_hierarchy();
        let session = session_with(builtin::REGIONAL_ADMIN, "r1", TenantType::Region, vec![]);

        let drilled = ScopeSelection::default()
            .select_zone(&TenantId::new("z1"), &session, &hierarchy)
            .unwrap()
            .select_woreda(&TenantId::new("w1"), &session, &hierarchy)
            .unwrap()
            .select_school(&TenantId::new("s1"), &session, &hierarchy)
            .unwrap();
        assert_eq!(
            effective_tenant(&session, &drilled),
            EffectiveTenant::new("s1", TenantType::Institution)
        );

        let switched = drilled
            .select_zone(&TenantId::new("z2"), &session, &hierarchy)
            .unwrap();
        assert_eq!(switched.selected_zone_id, Some(TenantId::new("z2")));
        assert_eq!(switched.selected_woreda_id, None);
        assert_eq!(switched.selected_school_id, None);
        assert_eq!(
            effective_tenant(&session, &switched),
            EffectiveTenant::new("z2", TenantType::Zone)
        );
    }

    #[test]
    fn test_school_must_lie_in_selected_woreda() {
        let hierarchy = bureau_hierarchy();
        let session = session_with(builtin::ZONE_ADMIN, "z1", TenantType::Zone, vec![]);
        let woreda = ScopeSelection::default()
            .select_woreda(&TenantId::new("w1"), &session, &hierarchy)
            .unwrap();

        assert!(woreda
            .select_school(&TenantId::new("s1"), &session, &hierarchy)
            .is_ok());
        assert!(matches!(
            woreda.select_school(&TenantId::new("s2"), &session, &hierarchy),
            Err(SelectionError::OutOfScope { .. })
        ));
        assert!(matches!(
            woreda.select_school(&TenantId::new("k1"), &session, &hierarchy),
            Err(SelectionError::WrongLevel { .. })
        ));
    }

    #[test]
    fn test_cell_resets_on_context_change() {
        let hierarchy = bureau_hierarchy();
        let regional = session_with(builtin::REGIONAL_ADMIN, "r1", TenantType::Region, vec![]);
        let zonal = session_with(builtin::ZONE_ADMIN, "z2", TenantType::Zone, vec![]);

        let cell = SelectionCell::new();
        cell.select_zone(&TenantId::new("z1"), &regional, &hierarchy)
            .unwrap();
        assert_eq!(cell.snapshot().selected_zone_id, Some(TenantId::new("z1")));

        assert!(cell.reset_for(&zonal));
        assert!(cell.snapshot().is_empty());
        assert!(!cell.reset_for(&zonal));
    }

    #[test]
    fn test_cell_readers_see_whole_updates() {
        let hierarchy = Arc::new(bureau_hierarchy());
        let session = Arc::new(session_with(
            builtin::REGIONAL_ADMIN,
            "r1",
            TenantType::Region,
            vec![],
        ));
        let cell = Arc::new(SelectionCell::new());
        cell.reset_for(&session);

        let writers: Vec<_> = ["z1", "z2"]
            .into_iter()
            .map(|zone| {
                let (cell, session, hierarchy) =
                    (Arc::clone(&cell), Arc::clone(&session), Arc::clone(&hierarchy));
                thread::spawn(move || {
                    let woreda = if zone == "z1" { "w1" } else { "w3" };
                    for _ in 0..100 {
                        cell.update(&session, |current| {
                            current
                                .select_zone(&TenantId::new(zone), &session, &hierarchy)?
                                .select_woreda(&TenantId::new(woreda), &session, &hierarchy)
                        })
                        .unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            let snapshot = cell.snapshot();
            if let (Some(zone), Some(woreda)) =
                (&snapshot.selected_zone_id, &snapshot.selected_woreda_id)
            {
                assert!(hierarchy.is_within(woreda, zone));
            }
        }
        for writer in writers {
            writer.join().unwrap();
        }
    }
}

// ============================================================================
// Data Scoping Tests
// ============================================================================

mod scoping {
    use super::*;

    #[test]
    fn test_own_scope_for_zone_user_excludes_institutions() {
        let hierarchy = bureau_hierarchy();
        let institutions = record_per_tenant(&["s1", "s2", "s3"]);
        let zone = EffectiveTenant::new("z1", TenantType::Zone);
        assert!(scope_data(&institutions, &zone, Scope::Own, &hierarchy).is_empty());
    }

    #[test]
    fn test_children_scope_keeps_zone_subtree() {
        let hierarchy = bureau_hierarchy();
        let records = record_per_tenant(&ALL_NODES);
        let zone = EffectiveTenant::new("z1", TenantType::Zone);
        let kept = scope_data(&records, &zone, Scope::Children, &hierarchy);
        assert_eq!(labels(&kept), vec!["z1", "w1", "w2", "k1", "s1", "s2"]);
    }

    #[test]
    fn test_scope_follows_resolved_permission() {
        let hierarchy = bureau_hierarchy();
        let session = session_with(
            builtin::ZONE_ADMIN,
            "z1",
            TenantType::Zone,
            vec![Permission::new("students", Action::View, Scope::Children)],
        );
        let selection = ScopeSelection::default()
            .select_woreda(&TenantId::new("w2"), &session, &hierarchy)
            .unwrap();

        let permissions = EffectivePermissions::resolve(&session);
        let scope = permissions
            .scope_for(&PermissionCheck::new("students", Action::View))
            .unwrap();
        let records = record_per_tenant(&ALL_NODES);
        let kept = scope_data(
            &records,
            &selection.effective_tenant(&session),
            scope,
            &hierarchy,
        );
        assert_eq!(labels(&kept), vec!["w2", "s2"]);
    }

    #[test]
    fn test_transitive_tags() {
        struct Payment {
            student: &'static str,
        }
        let hierarchy = bureau_hierarchy();
        let enrolled_at = |student: &str| match student {
            "hana" => Some(TenantId::new("s1")),
            "yonas" => Some(TenantId::new("s3")),
            _ => None,
        };
        let payments = vec![
            Payment { student: "hana" },
            Payment { student: "yonas" },
            Payment { student: "ghost" },
        ];
        let zone = EffectiveTenant::new("z2", TenantType::Zone);
        let kept = scope_data_by(
            &payments,
            |p| enrolled_at(p.student),
            &zone,
            Scope::Children,
            &hierarchy,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].student, "yonas");

        let everything = scope_data_by(
            &payments,
            |p| enrolled_at(p.student),
            &zone,
            Scope::All,
            &hierarchy,
        );
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_cached_filter_matches_uncached() {
        let hierarchy = bureau_hierarchy();
        let filter = ScopeFilter::new(&hierarchy);
        let records = record_per_tenant(&ALL_NODES);
        for id in ALL_NODES {
            let tenant_type = hierarchy.tenant_type(&TenantId::new(id)).unwrap();
            let effective = EffectiveTenant::new(id, tenant_type);
            for scope in [Scope::Own, Scope::Children, Scope::All] {
                assert_eq!(
                    filter.scope_data(&records, &effective, scope),
                    scope_data(&records, &effective, scope, &hierarchy)
                );
            }
        }
        assert_eq!(filter.cached_subtrees(), ALL_NODES.len());
    }
}

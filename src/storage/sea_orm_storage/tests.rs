use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use sea_orm::EntityTrait;

use super::SeaOrmStorage;
use crate::entity::{bids, tenders};
use crate::errors::ETenderError;
use crate::models::{
    PaginationQuery,
    auth::requests::{NewSignup, SignupProfile},
    awards::requests::CreateAwardRequest,
    bids::{entities::BidStatus, requests::SubmitBidRequest},
    departments::requests::NewDepartment,
    documents::entities::DocumentKind,
    tenders::{
        entities::TenderStatus,
        requests::{NewTender, TenderScope, UpdateTenderRequest},
    },
    users::entities::RoleName,
};
use crate::storage::Storage;

struct TestDb {
    storage: SeaOrmStorage,
    path: PathBuf,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

async fn test_db() -> TestDb {
    let path = std::env::temp_dir().join(format!("etender-test-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::connect(&url, 5, 30).await.unwrap();
    TestDb { storage, path }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap()
}

fn deadline() -> DateTime<Utc> {
    t0() + Duration::days(7)
}

/// 返回 (user_id, vendor_id)
async fn vendor(s: &SeaOrmStorage, name: &str) -> (i64, i64) {
    let created = s
        .signup(
            NewSignup {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "hash".into(),
                role: RoleName::Vendor,
                profile: SignupProfile::Vendor {
                    company_name: format!("{name} Pvt Ltd"),
                    registration_number: None,
                    gst_number: None,
                    address: None,
                },
            },
            t0(),
        )
        .await
        .unwrap();
    (created.user.id, created.vendor.unwrap().id)
}

/// 返回 (user_id, institute_id)
async fn institute(s: &SeaOrmStorage, name: &str) -> (i64, i64) {
    let created = s
        .signup(
            NewSignup {
                username: name.to_string(),
                email: format!("{name}@example.edu"),
                password_hash: "hash".into(),
                role: RoleName::InstituteAdmin,
                profile: SignupProfile::Institute {
                    institute_name: format!("{name} Institute"),
                    contact_email: format!("office@{name}.edu"),
                    contact_phone: None,
                    address: None,
                },
            },
            t0(),
        )
        .await
        .unwrap();
    (created.user.id, created.institute.unwrap().id)
}

async fn department(s: &SeaOrmStorage, institute_id: i64, name: &str) -> i64 {
    s.create_department(
        NewDepartment {
            institute_id,
            department_name: name.to_string(),
            username: format!("{}_{}", name.to_lowercase(), institute_id),
            password_hash: "hash".into(),
            head_of_department: None,
        },
        t0(),
    )
    .await
    .unwrap()
    .id
}

async fn draft_tender(s: &SeaOrmStorage, dept_id: i64, number: &str) -> i64 {
    s.create_tender(
        NewTender {
            tender_number: number.to_string(),
            title: format!("Tender {number}"),
            description: String::new(),
            estimated_cost: 1000.0,
            submission_deadline: deadline(),
            department_id: dept_id,
            category_name: Some("Works".into()),
        },
        ("department", dept_id),
        t0(),
    )
    .await
    .unwrap()
    .id
}

struct Scenario {
    admin_user: i64,
    institute_id: i64,
    dept_id: i64,
    tender_id: i64,
}

async fn open_tender(s: &SeaOrmStorage) -> Scenario {
    let (admin_user, institute_id) = institute(s, "iit").await;
    let dept_id = department(s, institute_id, "Civil").await;
    let tender_id = draft_tender(s, dept_id, "T-001").await;
    s.publish_tender(institute_id, tender_id, admin_user, t0())
        .await
        .unwrap();
    Scenario {
        admin_user,
        institute_id,
        dept_id,
        tender_id,
    }
}

async fn bid(s: &SeaOrmStorage, vendor_id: i64, tender_id: i64, amount: f64) -> i64 {
    s.submit_bid(vendor_id, SubmitBidRequest { tender_id, amount }, t0())
        .await
        .unwrap()
        .bid
        .id
}

fn award_request(bid_id: i64) -> CreateAwardRequest {
    CreateAwardRequest {
        bid_id,
        contract_start: deadline() + Duration::days(1),
        contract_end: deadline() + Duration::days(90),
    }
}

#[tokio::test]
async fn test_signup_and_lookup() {
    let db = test_db().await;
    let s = &db.storage;
    let (user_id, vendor_id) = vendor(s, "acme").await;

    let user = s
        .get_user_by_username_or_email("acme@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.roles, vec![RoleName::Vendor]);

    let profile = s.get_user_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.vendor.unwrap().id, vendor_id);
    assert!(profile.institute.is_none());

    let dup = s
        .signup(
            NewSignup {
                username: "acme".into(),
                email: "other@example.com".into(),
                password_hash: "hash".into(),
                role: RoleName::Vendor,
                profile: SignupProfile::Vendor {
                    company_name: "Dup".into(),
                    registration_number: None,
                    gst_number: None,
                    address: None,
                },
            },
            t0(),
        )
        .await;
    assert!(matches!(dup, Err(ETenderError::Conflict(_))));
}

#[tokio::test]
async fn test_publish_controls_visibility() {
    let db = test_db().await;
    let s = &db.storage;
    let (admin_user, institute_id) = institute(s, "iit").await;
    let (other_admin, other_institute) = institute(s, "nit").await;
    let dept_id = department(s, institute_id, "Civil").await;
    let tender_id = draft_tender(s, dept_id, "T-100").await;

    let public = s
        .list_tenders(TenderScope::Public, PaginationQuery::default(), None)
        .await
        .unwrap();
    assert_eq!(public.pagination.total, 0);

    let scoped = s
        .list_tenders(
            TenderScope::Institute(institute_id),
            PaginationQuery::default(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(scoped.items.len(), 1);
    assert_eq!(scoped.items[0].tender.status, TenderStatus::Draft);
    assert!(!scoped.items[0].tender.is_checked);
    assert_eq!(
        scoped.items[0].category.as_ref().unwrap().category_name,
        "Works"
    );

    let foreign = s
        .publish_tender(other_institute, tender_id, other_admin, t0())
        .await;
    assert!(matches!(foreign, Err(ETenderError::Authorization(_))));

    let published = s
        .publish_tender(institute_id, tender_id, admin_user, t0())
        .await
        .unwrap();
    assert_eq!(published.status, TenderStatus::Open);
    assert!(published.is_checked);
    assert_eq!(published.published_at, Some(t0()));

    // 重复发布幂等
    let again = s
        .publish_tender(institute_id, tender_id, admin_user, t0() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(again.published_at, Some(t0()));

    let public = s
        .list_tenders(TenderScope::Public, PaginationQuery::default(), None)
        .await
        .unwrap();
    assert_eq!(public.items.len(), 1);
    assert_eq!(public.items[0].institute.as_ref().unwrap().id, institute_id);

    let audit = s.list_audit_logs("tender", tender_id).await.unwrap();
    let actions: Vec<&str> = audit.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(actions, vec!["tender.create", "tender.publish"]);
}

#[tokio::test]
async fn test_duplicate_tender_number_conflicts() {
    let db = test_db().await;
    let s = &db.storage;
    let (_, institute_id) = institute(s, "iit").await;
    let dept_id = department(s, institute_id, "Civil").await;
    draft_tender(s, dept_id, "T-7").await;

    let dup = s
        .create_tender(
            NewTender {
                tender_number: "T-7".into(),
                title: "Again".into(),
                description: String::new(),
                estimated_cost: 10.0,
                submission_deadline: deadline(),
                department_id: dept_id,
                category_name: Some("Works".into()),
            },
            ("department", dept_id),
            t0(),
        )
        .await;
    assert!(matches!(dup, Err(ETenderError::Conflict(_))));
    assert_eq!(s.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bid_requires_open_tender() {
    let db = test_db().await;
    let s = &db.storage;
    let (_, institute_id) = institute(s, "iit").await;
    let dept_id = department(s, institute_id, "Civil").await;
    let tender_id = draft_tender(s, dept_id, "T-1").await;
    let (_, vendor_id) = vendor(s, "acme").await;

    let res = s
        .submit_bid(
            vendor_id,
            SubmitBidRequest {
                tender_id,
                amount: 500.0,
            },
            t0(),
        )
        .await;
    assert!(matches!(res, Err(ETenderError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_bid_conflicts() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, vendor_id) = vendor(s, "acme").await;

    let first = s
        .submit_bid(
            vendor_id,
            SubmitBidRequest {
                tender_id: sc.tender_id,
                amount: 900.0,
            },
            t0(),
        )
        .await
        .unwrap();
    assert_eq!(first.bid.status, BidStatus::Submitted);
    assert_eq!(first.tender.bids_received, 1);
    assert!(first.tender.user_bid_submitted);

    let second = s
        .submit_bid(
            vendor_id,
            SubmitBidRequest {
                tender_id: sc.tender_id,
                amount: 800.0,
            },
            t0(),
        )
        .await;
    assert!(matches!(second, Err(ETenderError::Conflict(_))));
}

#[tokio::test]
async fn test_concurrent_duplicate_bids_only_one_wins() {
    let db = test_db().await;
    let storage = Arc::new(db.storage.clone());
    let sc = open_tender(&storage).await;
    let (_, vendor_id) = vendor(&storage, "acme").await;

    let mut handles = Vec::new();
    for i in 0..4 {
        let s = storage.clone();
        let tender_id = sc.tender_id;
        handles.push(tokio::spawn(async move {
            s.submit_bid(
                vendor_id,
                SubmitBidRequest {
                    tender_id,
                    amount: 100.0 + i as f64,
                },
                t0(),
            )
            .await
        }));
    }

    let mut ok = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(matches!(e, ETenderError::Conflict(_)), "unexpected: {e}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(storage.list_vendor_bids(vendor_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bid_after_deadline_conflicts() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, vendor_id) = vendor(s, "late").await;

    let res = s
        .submit_bid(
            vendor_id,
            SubmitBidRequest {
                tender_id: sc.tender_id,
                amount: 10.0,
            },
            deadline(),
        )
        .await;
    assert!(matches!(res, Err(ETenderError::Conflict(_))));
}

#[tokio::test]
async fn test_award_before_deadline_is_rejected() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, vendor_id) = vendor(s, "acme").await;
    let bid_id = bid(s, vendor_id, sc.tender_id, 700.0).await;

    let res = s
        .award_bid(
            sc.institute_id,
            sc.admin_user,
            award_request(bid_id),
            deadline() - Duration::minutes(1),
        )
        .await;
    assert!(matches!(res, Err(ETenderError::Conflict(_))));

    let tender = s.get_tender_by_id(sc.tender_id).await.unwrap().unwrap();
    assert_eq!(tender.status, TenderStatus::Open);
}

#[tokio::test]
async fn test_award_cascades_to_submitted_bids_only() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (winner_user, winner) = vendor(s, "winner").await;
    let (loser_user, loser) = vendor(s, "loser").await;
    let (_, quitter) = vendor(s, "quitter").await;

    let winning_bid = bid(s, winner, sc.tender_id, 700.0).await;
    let losing_bid = bid(s, loser, sc.tender_id, 800.0).await;
    let withdrawn_bid = bid(s, quitter, sc.tender_id, 650.0).await;
    s.update_bid_status(quitter, withdrawn_bid, BidStatus::Withdrawn)
        .await
        .unwrap();

    let detail = s
        .award_bid(
            sc.institute_id,
            sc.admin_user,
            award_request(winning_bid),
            deadline() + Duration::hours(1),
        )
        .await
        .unwrap();
    assert_eq!(detail.bid.status, BidStatus::Awarded);
    assert_eq!(detail.tender.status, TenderStatus::Awarded);
    assert_eq!(detail.disqualified_bids, 1);

    let listed = s
        .list_tenders(
            TenderScope::Department(sc.dept_id),
            PaginationQuery::default(),
            None,
        )
        .await
        .unwrap();
    let statuses: Vec<(i64, BidStatus)> = listed.items[0]
        .bids
        .iter()
        .map(|b| (b.bid.id, b.bid.status))
        .collect();
    assert!(statuses.contains(&(winning_bid, BidStatus::Awarded)));
    assert!(statuses.contains(&(losing_bid, BidStatus::Disqualified)));
    assert!(statuses.contains(&(withdrawn_bid, BidStatus::Withdrawn)));
    assert_eq!(
        statuses
            .iter()
            .filter(|(_, st)| *st == BidStatus::Awarded)
            .count(),
        1
    );
    let winner_row = listed.items[0]
        .bids
        .iter()
        .find(|b| b.bid.id == winning_bid)
        .unwrap();
    assert!(winner_row.award.is_some());

    let winner_inbox = s
        .list_notifications(winner_user, PaginationQuery::default())
        .await
        .unwrap();
    assert_eq!(winner_inbox.items.len(), 1);
    assert_eq!(winner_inbox.unread_count, 1);
    let loser_inbox = s
        .list_notifications(loser_user, PaginationQuery::default())
        .await
        .unwrap();
    assert_eq!(loser_inbox.items.len(), 1);

    let audit = s.list_audit_logs("tender", sc.tender_id).await.unwrap();
    assert!(audit.iter().any(|a| a.action == "award.create"));

    let awards = s.list_awards(sc.institute_id).await.unwrap();
    assert_eq!(awards.len(), 1);
    assert_eq!(awards[0].bid.id, winning_bid);
}

#[tokio::test]
async fn test_second_award_conflicts() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, a) = vendor(s, "alpha").await;
    let (_, b) = vendor(s, "beta").await;
    let bid_a = bid(s, a, sc.tender_id, 100.0).await;
    let bid_b = bid(s, b, sc.tender_id, 120.0).await;
    let after = deadline() + Duration::days(1);

    s.award_bid(sc.institute_id, sc.admin_user, award_request(bid_a), after)
        .await
        .unwrap();

    let again = s
        .award_bid(sc.institute_id, sc.admin_user, award_request(bid_b), after)
        .await;
    assert!(matches!(again, Err(ETenderError::Conflict(_))));
    let same = s
        .award_bid(sc.institute_id, sc.admin_user, award_request(bid_a), after)
        .await;
    assert!(matches!(same, Err(ETenderError::Conflict(_))));

    assert_eq!(s.list_awards(sc.institute_id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_awards_only_one_wins() {
    let db = test_db().await;
    let storage = Arc::new(db.storage.clone());
    let sc = open_tender(&storage).await;

    let mut bid_ids = Vec::new();
    for i in 0..5 {
        let (_, v) = vendor(&storage, &format!("vendor{i}")).await;
        bid_ids.push(bid(&storage, v, sc.tender_id, 100.0 + i as f64).await);
    }

    let after = deadline() + Duration::days(1);
    let mut handles = Vec::new();
    for bid_id in bid_ids {
        let s = storage.clone();
        let (institute_id, admin_user) = (sc.institute_id, sc.admin_user);
        handles.push(tokio::spawn(async move {
            s.award_bid(institute_id, admin_user, award_request(bid_id), after)
                .await
        }));
    }

    let mut winners = Vec::new();
    for h in handles {
        match h.await.unwrap() {
            Ok(detail) => winners.push(detail),
            Err(e) => assert!(matches!(e, ETenderError::Conflict(_)), "unexpected: {e}"),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].disqualified_bids, 4);

    let awards = storage.list_awards(sc.institute_id).await.unwrap();
    assert_eq!(awards.len(), 1);
    assert_eq!(awards[0].bid.id, winners[0].bid.id);
}

#[tokio::test]
async fn test_award_rechecks_bid_status_inside_transaction() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, a) = vendor(s, "alpha").await;
    let (_, b) = vendor(s, "beta").await;
    let bid_a = bid(s, a, sc.tender_id, 100.0).await;
    let bid_b = bid(s, b, sc.tender_id, 120.0).await;
    let after = deadline() + Duration::days(1);

    // 先读出授标前的行，再让供应商撤回
    let stale_a = bids::Entity::find_by_id(bid_a)
        .one(&s.db)
        .await
        .unwrap()
        .unwrap();
    let stale_b = bids::Entity::find_by_id(bid_b)
        .one(&s.db)
        .await
        .unwrap()
        .unwrap();
    let stale_tender = tenders::Entity::find_by_id(sc.tender_id)
        .one(&s.db)
        .await
        .unwrap()
        .unwrap();
    s.update_bid_status(a, bid_a, BidStatus::Withdrawn)
        .await
        .unwrap();

    let res = s
        .run_award_transaction(
            stale_a,
            stale_tender.clone(),
            sc.admin_user,
            &award_request(bid_a),
            after,
        )
        .await;
    assert!(matches!(res, Err(ETenderError::Conflict(_))));
    let withdrawn = s.get_vendor_bid(a, bid_a).await.unwrap().unwrap();
    assert_eq!(withdrawn.bid.status, BidStatus::Withdrawn);
    assert!(withdrawn.award.is_none());
    let tender = s.get_tender_by_id(sc.tender_id).await.unwrap().unwrap();
    assert_eq!(tender.status, TenderStatus::Open);

    // 撤回的投标也不会被改成 DISQUALIFIED
    let detail = s
        .run_award_transaction(
            stale_b,
            stale_tender,
            sc.admin_user,
            &award_request(bid_b),
            after,
        )
        .await
        .unwrap();
    assert_eq!(detail.disqualified_bids, 0);
    let still_withdrawn = s.get_vendor_bid(a, bid_a).await.unwrap().unwrap();
    assert_eq!(still_withdrawn.bid.status, BidStatus::Withdrawn);
}

#[tokio::test]
async fn test_award_from_other_institute_is_forbidden() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (other_admin, other_institute) = institute(s, "nit").await;
    let (_, v) = vendor(s, "acme").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;

    let res = s
        .award_bid(
            other_institute,
            other_admin,
            award_request(bid_id),
            deadline() + Duration::days(1),
        )
        .await;
    assert!(matches!(res, Err(ETenderError::Authorization(_))));

    let missing = s
        .award_bid(
            sc.institute_id,
            sc.admin_user,
            award_request(9999),
            deadline() + Duration::days(1),
        )
        .await;
    assert!(matches!(missing, Err(ETenderError::NotFound(_))));
}

#[tokio::test]
async fn test_withdraw_rules() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, v) = vendor(s, "acme").await;
    let (_, other) = vendor(s, "other").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;

    let not_mine = s.update_bid_status(other, bid_id, BidStatus::Withdrawn).await;
    assert!(matches!(not_mine, Err(ETenderError::NotFound(_))));

    let self_award = s.update_bid_status(v, bid_id, BidStatus::Awarded).await;
    assert!(matches!(self_award, Err(ETenderError::Conflict(_))));

    let withdrawn = s
        .update_bid_status(v, bid_id, BidStatus::Withdrawn)
        .await
        .unwrap();
    assert_eq!(withdrawn.status, BidStatus::Withdrawn);

    let twice = s.update_bid_status(v, bid_id, BidStatus::Withdrawn).await;
    assert!(matches!(twice, Err(ETenderError::Conflict(_))));
}

#[tokio::test]
async fn test_deadline_frozen_after_first_bid() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;

    let moved = s
        .update_tender(
            sc.dept_id,
            sc.tender_id,
            UpdateTenderRequest {
                submission_deadline: Some(deadline() + Duration::days(1)),
                ..Default::default()
            },
            t0(),
        )
        .await
        .unwrap();
    assert_eq!(moved.submission_deadline, deadline() + Duration::days(1));

    let (_, v) = vendor(s, "acme").await;
    bid(s, v, sc.tender_id, 100.0).await;

    let frozen = s
        .update_tender(
            sc.dept_id,
            sc.tender_id,
            UpdateTenderRequest {
                submission_deadline: Some(deadline() + Duration::days(5)),
                ..Default::default()
            },
            t0(),
        )
        .await;
    assert!(matches!(frozen, Err(ETenderError::Conflict(_))));
    let stored = s.get_tender_by_id(sc.tender_id).await.unwrap().unwrap();
    assert_eq!(stored.submission_deadline, deadline() + Duration::days(1));

    // 截止时间不变时不受限制
    let same_deadline = s
        .update_tender(
            sc.dept_id,
            sc.tender_id,
            UpdateTenderRequest {
                submission_deadline: Some(deadline() + Duration::days(1)),
                estimated_cost: Some(1500.0),
                ..Default::default()
            },
            t0(),
        )
        .await
        .unwrap();
    assert_eq!(same_deadline.estimated_cost, 1500.0);

    let retitled = s
        .update_tender(
            sc.dept_id,
            sc.tender_id,
            UpdateTenderRequest {
                title: Some("Renamed".into()),
                ..Default::default()
            },
            t0(),
        )
        .await
        .unwrap();
    assert_eq!(retitled.title, "Renamed");
}

#[tokio::test]
async fn test_soft_delete_cascades_to_bids() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, v) = vendor(s, "acme").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;

    let other_dept = department(s, sc.institute_id, "Mechanical").await;
    let foreign = s.delete_tender(other_dept, sc.tender_id, t0()).await;
    assert!(matches!(foreign, Err(ETenderError::NotFound(_))));

    s.delete_tender(sc.dept_id, sc.tender_id, t0()).await.unwrap();

    assert!(s.get_tender_by_id(sc.tender_id).await.unwrap().is_none());
    assert!(s.get_vendor_bid(v, bid_id).await.unwrap().is_none());
    let public = s
        .list_tenders(TenderScope::Public, PaginationQuery::default(), None)
        .await
        .unwrap();
    assert!(public.items.is_empty());
}

#[tokio::test]
async fn test_awarded_tender_cannot_be_deleted() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, v) = vendor(s, "acme").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;
    s.award_bid(
        sc.institute_id,
        sc.admin_user,
        award_request(bid_id),
        deadline() + Duration::days(1),
    )
    .await
    .unwrap();

    let res = s.delete_tender(sc.dept_id, sc.tender_id, t0()).await;
    assert!(matches!(res, Err(ETenderError::Conflict(_))));
}

#[tokio::test]
async fn test_soft_delete_rechecks_award_inside_transaction() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, v) = vendor(s, "acme").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;
    s.award_bid(
        sc.institute_id,
        sc.admin_user,
        award_request(bid_id),
        deadline() + Duration::days(1),
    )
    .await
    .unwrap();

    // 跳过事务外的预检，直接走删除事务
    let res = s.soft_delete_tender(sc.dept_id, sc.tender_id, t0()).await;
    assert!(matches!(res, Err(ETenderError::Conflict(_))));

    let tender = s.get_tender_by_id(sc.tender_id).await.unwrap().unwrap();
    assert_eq!(tender.status, TenderStatus::Awarded);
    let awarded = s.get_vendor_bid(v, bid_id).await.unwrap().unwrap();
    assert_eq!(awarded.bid.status, BidStatus::Awarded);
    let audit = s.list_audit_logs("tender", sc.tender_id).await.unwrap();
    assert!(audit.iter().all(|a| a.action != "tender.delete"));
}

#[tokio::test]
async fn test_documents_of_deleted_tender_are_not_found() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, v) = vendor(s, "acme").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;
    let tender_doc = s
        .add_tender_document(sc.tender_id, "boq.pdf".into(), "tender/1_boq.pdf".into(), t0())
        .await
        .unwrap();
    let bid_doc = s
        .add_bid_document(bid_id, "quote.pdf".into(), "bids/1_quote.pdf".into(), t0())
        .await
        .unwrap();

    s.delete_tender(sc.dept_id, sc.tender_id, t0()).await.unwrap();

    assert!(
        s.get_document_ownership(DocumentKind::Tender, tender_doc.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        s.get_document_ownership(DocumentKind::Bid, bid_doc.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_tender_children_and_projection() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (_, v) = vendor(s, "acme").await;

    s.add_corrigendum(sc.dept_id, sc.tender_id, "Date moved".into(), t0())
        .await
        .unwrap();
    s.add_evaluation_criterion(sc.dept_id, sc.tender_id, "Price".into(), 70.0)
        .await
        .unwrap();
    let q = s
        .ask_clarification(v, sc.tender_id, "Is GST included?".into(), t0())
        .await
        .unwrap();
    let answered = s
        .answer_clarification(sc.dept_id, q.id, "Yes".into(), t0())
        .await
        .unwrap();
    assert_eq!(answered.answer.as_deref(), Some("Yes"));
    let doc = s
        .add_tender_document(sc.tender_id, "boq.pdf".into(), "tender/1_boq.pdf".into(), t0())
        .await
        .unwrap();
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;

    let page = s
        .list_tenders(TenderScope::Public, PaginationQuery::default(), Some(v))
        .await
        .unwrap();
    let detail = &page.items[0];
    assert_eq!(detail.corrigenda.len(), 1);
    assert_eq!(detail.evaluation_criteria.len(), 1);
    assert_eq!(detail.clarifications.len(), 1);
    assert_eq!(detail.documents[0].id, doc.id);
    assert_eq!(detail.bids_received, 1);
    assert!(detail.user_bid_submitted);
    let vendor_info = detail.bids[0].vendor.as_ref().unwrap();
    assert_eq!(vendor_info.vendor_id, v);
    assert_eq!(vendor_info.user.as_ref().unwrap().username, "acme");

    let other_view = s
        .list_tenders(TenderScope::Public, PaginationQuery::default(), Some(v + 100))
        .await
        .unwrap();
    assert!(!other_view.items[0].user_bid_submitted);

    let ownership = s
        .get_document_ownership(DocumentKind::Tender, doc.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ownership.tender_department_id, Some(sc.dept_id));
    assert_eq!(ownership.tender_institute_id, Some(sc.institute_id));
    assert!(ownership.tender_published);

    let bid_doc = s
        .add_bid_document(bid_id, "quote.pdf".into(), "bids/1_quote.pdf".into(), t0())
        .await
        .unwrap();
    let ownership = s
        .get_document_ownership(DocumentKind::Bid, bid_doc.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ownership.bid_vendor_id, Some(v));
    assert!(
        s.get_document_ownership(DocumentKind::Bid, 9999)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_category_rules() {
    let db = test_db().await;
    let s = &db.storage;
    s.create_category("Goods", t0()).await.unwrap();
    let dup = s.create_category("Goods", t0()).await;
    assert!(matches!(dup, Err(ETenderError::Conflict(_))));

    let (_, institute_id) = institute(s, "iit").await;
    let dept_id = department(s, institute_id, "Civil").await;
    s.create_tender(
        NewTender {
            tender_number: "T-G".into(),
            title: "Chairs".into(),
            description: String::new(),
            estimated_cost: 50.0,
            submission_deadline: deadline(),
            department_id: dept_id,
            category_name: Some("Goods".into()),
        },
        ("department", dept_id),
        t0(),
    )
    .await
    .unwrap();
    assert_eq!(s.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_department_name_unique_per_institute() {
    let db = test_db().await;
    let s = &db.storage;
    let (_, iit) = institute(s, "iit").await;
    let (_, nit) = institute(s, "nit").await;
    department(s, iit, "Civil").await;
    department(s, nit, "Civil").await;

    let dup = s
        .create_department(
            NewDepartment {
                institute_id: iit,
                department_name: "Civil".into(),
                username: "civil_999".into(),
                password_hash: "hash".into(),
                head_of_department: None,
            },
            t0(),
        )
        .await;
    assert!(matches!(dup, Err(ETenderError::Conflict(_))));
    assert_eq!(s.list_departments(iit).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_notification_read_is_owner_only() {
    let db = test_db().await;
    let s = &db.storage;
    let sc = open_tender(s).await;
    let (winner_user, v) = vendor(s, "acme").await;
    let (stranger, _) = vendor(s, "stranger").await;
    let bid_id = bid(s, v, sc.tender_id, 100.0).await;
    s.award_bid(
        sc.institute_id,
        sc.admin_user,
        award_request(bid_id),
        deadline() + Duration::days(1),
    )
    .await
    .unwrap();

    let inbox = s
        .list_notifications(winner_user, PaginationQuery::default())
        .await
        .unwrap();
    let id = inbox.items[0].id;

    assert!(!s.mark_notification_read(stranger, id).await.unwrap());
    assert!(s.mark_notification_read(winner_user, id).await.unwrap());
    let inbox = s
        .list_notifications(winner_user, PaginationQuery::default())
        .await
        .unwrap();
    assert_eq!(inbox.unread_count, 0);
}

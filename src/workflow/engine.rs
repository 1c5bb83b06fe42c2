use crate::model::department::Department;
use crate::model::faculty::Faculty;
use crate::model::hod::Hod;
use crate::model::od_request::{OdRequest, OdRequestDraft};
use crate::model::role::Role;
use crate::model::status::{OdAction, OdStatus, next_status};
use crate::store::{Collection, Record, SharedStore, decode, encode};
use crate::workflow::error::WorkflowError;
use serde_json::json;
use tracing::info;

/// The caller on whose behalf an operation runs. Always passed
/// explicitly; the engine never reads ambient session state.
#[derive(Debug, Clone)]
pub struct ActorIdentity {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub register_no: Option<String>,
}

/// Role-gated state machine over OD request documents. Stateless apart
/// from the injected store: every operation reads current state,
/// validates, then issues exactly one write.
#[derive(Clone)]
pub struct WorkflowEngine {
    store: SharedStore,
}

impl WorkflowEngine {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a new request in `pending`. All draft fields must be
    /// non-empty, the department must exist, and the tutor must belong
    /// to that department.
    pub async fn submit(&self, draft: OdRequestDraft) -> Result<OdRequest, WorkflowError> {
        for (field, value) in [
            ("student_name", &draft.student_name),
            ("register_no", &draft.register_no),
            ("reason", &draft.reason),
            ("department", &draft.department),
            ("faculty_email", &draft.faculty_email),
        ] {
            if value.trim().is_empty() {
                return Err(WorkflowError::Validation(format!("{field} is required")));
            }
        }

        let departments = self
            .store
            .find_eq(Collection::Departments, "name", &draft.department)
            .await?;
        if departments.is_empty() {
            return Err(WorkflowError::Reference(format!(
                "unknown department {}",
                draft.department
            )));
        }

        let faculty = self
            .store
            .find_eq(Collection::Faculty, "email", &draft.faculty_email)
            .await?;
        let faculty: Faculty = match faculty.first() {
            Some(record) => decode(Collection::Faculty, record)?,
            None => {
                return Err(WorkflowError::Reference(format!(
                    "unknown faculty {}",
                    draft.faculty_email
                )));
            }
        };
        if faculty.department != draft.department {
            return Err(WorkflowError::Reference(format!(
                "faculty {} does not belong to department {}",
                draft.faculty_email, draft.department
            )));
        }

        let mut fields = encode(&draft);
        fields.insert("faculty_name".into(), json!(faculty.name));
        fields.insert("status".into(), json!(OdStatus::Pending));

        let record = self.store.insert(Collection::OdRequests, fields).await?;
        info!(id = %record.id, register_no = %draft.register_no, "OD request submitted");

        decode(Collection::OdRequests, &record).map_err(Into::into)
    }

    /// Apply one action to one request. The update compare-and-swaps on
    /// the version read here, so a concurrent transition on the same id
    /// fails with a conflict instead of silently winning.
    pub async fn transition(
        &self,
        request_id: &str,
        actor: &ActorIdentity,
        action: OdAction,
    ) -> Result<OdRequest, WorkflowError> {
        let record = self
            .store
            .get(Collection::OdRequests, request_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("OD request {request_id} not found"))
            })?;
        let request: OdRequest = decode(Collection::OdRequests, &record)?;

        let next = next_status(request.status, actor.role, action).ok_or_else(|| {
            WorkflowError::InvalidTransition(format!(
                "{action} by {} is not allowed from {}",
                actor.role, request.status
            ))
        })?;

        match actor.role {
            Role::Faculty => {
                if actor.email != request.faculty_email {
                    return Err(WorkflowError::InvalidTransition(format!(
                        "request {request_id} is assigned to a different tutor"
                    )));
                }
            }
            Role::Hod => {
                let hod = self.hod_by_email(&actor.email).await?.ok_or_else(|| {
                    WorkflowError::InvalidTransition(format!(
                        "no HOD record for {}",
                        actor.email
                    ))
                })?;
                if hod.department != request.department {
                    return Err(WorkflowError::InvalidTransition(format!(
                        "request {request_id} belongs to a different department"
                    )));
                }
            }
            // next_status never yields a transition for students
            Role::Student => unreachable!("student transitions are never legal"),
        }

        let mut patch = serde_json::Map::new();
        patch.insert("status".into(), json!(next));

        let updated = self
            .store
            .update(Collection::OdRequests, &request.id, request.version, patch)
            .await?;
        info!(id = %request.id, from = %request.status, to = %next, "OD request transitioned");

        decode(Collection::OdRequests, &updated).map_err(Into::into)
    }

    /// Requests visible to the caller, scoped by role: students see
    /// their own, tutors their queue, HODs their department's forwarded
    /// and decided requests.
    pub async fn list_for_role(
        &self,
        actor: &ActorIdentity,
    ) -> Result<Vec<OdRequest>, WorkflowError> {
        match actor.role {
            Role::Student => {
                let register_no = actor.register_no.as_deref().ok_or_else(|| {
                    WorkflowError::Validation(
                        "no register number linked to this account".to_string(),
                    )
                })?;
                let records = self
                    .store
                    .find_eq(Collection::OdRequests, "register_no", register_no)
                    .await?;
                decode_requests(&records)
            }
            Role::Faculty => {
                let records = self
                    .store
                    .find_eq(Collection::OdRequests, "faculty_email", &actor.email)
                    .await?;
                let requests = decode_requests(&records)?;
                Ok(requests
                    .into_iter()
                    .filter(|r| {
                        matches!(
                            r.status,
                            OdStatus::Pending
                                | OdStatus::ApprovedByTutor
                                | OdStatus::RejectedByTutor
                                | OdStatus::ForwardedToHod
                        )
                    })
                    .collect())
            }
            Role::Hod => {
                let hod = self.hod_by_email(&actor.email).await?.ok_or_else(|| {
                    WorkflowError::Reference(format!("no HOD record for {}", actor.email))
                })?;
                let records = self
                    .store
                    .find_eq(Collection::OdRequests, "department", &hod.department)
                    .await?;
                let requests = decode_requests(&records)?;
                Ok(requests
                    .into_iter()
                    .filter(|r| {
                        matches!(
                            r.status,
                            OdStatus::ForwardedToHod
                                | OdStatus::ApprovedByHod
                                | OdStatus::RejectedByHod
                        )
                    })
                    .collect())
            }
        }
    }

    /// Public status lookup by register number.
    pub async fn track(&self, register_no: &str) -> Result<Vec<OdRequest>, WorkflowError> {
        if register_no.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "register_no is required".to_string(),
            ));
        }

        let records = self
            .store
            .find_eq(Collection::OdRequests, "register_no", register_no)
            .await?;
        decode_requests(&records)
    }

    pub async fn get(&self, request_id: &str) -> Result<OdRequest, WorkflowError> {
        let record = self
            .store
            .get(Collection::OdRequests, request_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("OD request {request_id} not found"))
            })?;

        decode(Collection::OdRequests, &record).map_err(Into::into)
    }

    pub async fn departments(&self) -> Result<Vec<Department>, WorkflowError> {
        let records = self.store.list(Collection::Departments).await?;
        records
            .iter()
            .map(|r| decode(Collection::Departments, r).map_err(Into::into))
            .collect()
    }

    pub async fn faculty(&self, department: Option<&str>) -> Result<Vec<Faculty>, WorkflowError> {
        let records = match department {
            Some(name) => {
                self.store
                    .find_eq(Collection::Faculty, "department", name)
                    .await?
            }
            None => self.store.list(Collection::Faculty).await?,
        };

        records
            .iter()
            .map(|r| decode(Collection::Faculty, r).map_err(Into::into))
            .collect()
    }

    async fn hod_by_email(&self, email: &str) -> Result<Option<Hod>, WorkflowError> {
        let records = self.store.find_eq(Collection::Hods, "email", email).await?;

        records
            .first()
            .map(|r| decode(Collection::Hods, r).map_err(Into::into))
            .transpose()
    }
}

fn decode_requests(records: &[Record]) -> Result<Vec<OdRequest>, WorkflowError> {
    records
        .iter()
        .map(|r| decode(Collection::OdRequests, r).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::sync::Arc;

    const FACULTY_EMAIL: &str = "jane.smith@college.edu";
    const HOD_EMAIL: &str = "hod.bca@college.edu";

    async fn seeded_engine() -> WorkflowEngine {
        let store: SharedStore = Arc::new(MemoryStore::new());

        let seed: [(Collection, Value); 5] = [
            (
                Collection::Departments,
                json!({"name": "BCA", "hod_email": HOD_EMAIL}),
            ),
            (
                Collection::Departments,
                json!({"name": "BBA", "hod_email": "hod.bba@college.edu"}),
            ),
            (
                Collection::Faculty,
                json!({"name": "Jane Smith", "email": FACULTY_EMAIL, "department": "BCA"}),
            ),
            (
                Collection::Hods,
                json!({"name": "Ravi Kumar", "email": HOD_EMAIL, "department": "BCA"}),
            ),
            (
                Collection::Hods,
                json!({"name": "Asha Menon", "email": "hod.bba@college.edu", "department": "BBA"}),
            ),
        ];
        for (collection, fields) in seed {
            let Value::Object(fields) = fields else {
                unreachable!()
            };
            store.insert(collection, fields).await.unwrap();
        }

        WorkflowEngine::new(store)
    }

    fn draft(register_no: &str) -> OdRequestDraft {
        OdRequestDraft {
            student_name: "John Doe".into(),
            register_no: register_no.into(),
            reason: "Participating in inter-college event".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            department: "BCA".into(),
            faculty_email: FACULTY_EMAIL.into(),
        }
    }

    fn student(register_no: &str) -> ActorIdentity {
        ActorIdentity {
            email: "john.doe@college.edu".into(),
            name: "John Doe".into(),
            role: Role::Student,
            register_no: Some(register_no.into()),
        }
    }

    fn faculty(email: &str) -> ActorIdentity {
        ActorIdentity {
            email: email.into(),
            name: "Jane Smith".into(),
            role: Role::Faculty,
            register_no: None,
        }
    }

    fn hod(email: &str) -> ActorIdentity {
        ActorIdentity {
            email: email.into(),
            name: "Ravi Kumar".into(),
            role: Role::Hod,
            register_no: None,
        }
    }

    #[actix_web::test]
    async fn submit_creates_a_pending_request_with_fresh_id() {
        let engine = seeded_engine().await;

        let a = engine.submit(draft("R1")).await.unwrap();
        let b = engine.submit(draft("R2")).await.unwrap();

        assert_eq!(a.status, OdStatus::Pending);
        assert_eq!(a.faculty_name, "Jane Smith");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[actix_web::test]
    async fn submit_rejects_empty_fields() {
        let engine = seeded_engine().await;

        let mut empty_reason = draft("R1");
        empty_reason.reason = "  ".into();

        let err = engine.submit(empty_reason).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[actix_web::test]
    async fn submit_rejects_unknown_department() {
        let engine = seeded_engine().await;

        let mut unknown = draft("R1");
        unknown.department = "MBA".into();

        let err = engine.submit(unknown).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Reference(_)));
    }

    #[actix_web::test]
    async fn submit_rejects_faculty_outside_the_department() {
        let engine = seeded_engine().await;

        let mut wrong_dept = draft("R1");
        wrong_dept.department = "BBA".into();

        let err = engine.submit(wrong_dept).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Reference(_)));
    }

    #[actix_web::test]
    async fn only_the_assigned_tutor_acts_on_pending() {
        let engine = seeded_engine().await;
        let od = engine.submit(draft("R1")).await.unwrap();

        let err = engine
            .transition(&od.id, &faculty("other@college.edu"), OdAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));

        let err = engine
            .transition(&od.id, &student("R1"), OdAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));

        let approved = engine
            .transition(&od.id, &faculty(FACULTY_EMAIL), OdAction::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, OdStatus::ApprovedByTutor);
        assert_eq!(approved.version, od.version + 1);
    }

    #[actix_web::test]
    async fn hod_cannot_act_before_forward() {
        let engine = seeded_engine().await;
        let od = engine.submit(draft("R1")).await.unwrap();

        let err = engine
            .transition(&od.id, &hod(HOD_EMAIL), OdAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));
    }

    #[actix_web::test]
    async fn forwarded_request_is_decided_by_the_matching_hod_only() {
        let engine = seeded_engine().await;
        let od = engine.submit(draft("R1")).await.unwrap();
        engine
            .transition(&od.id, &faculty(FACULTY_EMAIL), OdAction::Forward)
            .await
            .unwrap();

        // wrong department
        let err = engine
            .transition(&od.id, &hod("hod.bba@college.edu"), OdAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));

        // hod-labelled user without a hod record
        let err = engine
            .transition(&od.id, &hod("ghost@college.edu"), OdAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));

        // forward never cascades
        let err = engine
            .transition(&od.id, &hod(HOD_EMAIL), OdAction::Forward)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition(_)));

        let approved = engine
            .transition(&od.id, &hod(HOD_EMAIL), OdAction::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, OdStatus::ApprovedByHod);
    }

    #[actix_web::test]
    async fn terminal_states_reject_every_transition() {
        let engine = seeded_engine().await;
        let od = engine.submit(draft("R1")).await.unwrap();
        engine
            .transition(&od.id, &faculty(FACULTY_EMAIL), OdAction::Reject)
            .await
            .unwrap();

        for actor in [faculty(FACULTY_EMAIL), hod(HOD_EMAIL), student("R1")] {
            for action in [OdAction::Approve, OdAction::Reject, OdAction::Forward] {
                let err = engine.transition(&od.id, &actor, action).await.unwrap_err();
                assert!(matches!(err, WorkflowError::InvalidTransition(_)));
            }
        }
    }

    #[actix_web::test]
    async fn transition_on_unknown_id_is_not_found() {
        let engine = seeded_engine().await;

        let err = engine
            .transition("missing", &faculty(FACULTY_EMAIL), OdAction::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[actix_web::test]
    async fn listing_scopes_by_role() {
        let engine = seeded_engine().await;
        let first = engine.submit(draft("R1")).await.unwrap();
        engine.submit(draft("R2")).await.unwrap();
        engine
            .transition(&first.id, &faculty(FACULTY_EMAIL), OdAction::Forward)
            .await
            .unwrap();

        let mine = engine.list_for_role(&student("R1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].register_no, "R1");

        // faculty sees every stage it participated in
        let queue = engine.list_for_role(&faculty(FACULTY_EMAIL)).await.unwrap();
        assert_eq!(queue.len(), 2);

        // hod sees only the forwarded one
        let desk = engine.list_for_role(&hod(HOD_EMAIL)).await.unwrap();
        assert_eq!(desk.len(), 1);
        assert_eq!(desk[0].status, OdStatus::ForwardedToHod);

        // other department's hod sees nothing
        let other = engine
            .list_for_role(&hod("hod.bba@college.edu"))
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[actix_web::test]
    async fn listing_is_idempotent_without_writes() {
        let engine = seeded_engine().await;
        engine.submit(draft("R1")).await.unwrap();
        engine.submit(draft("R1")).await.unwrap();

        let first = engine.list_for_role(&student("R1")).await.unwrap();
        let second = engine.list_for_role(&student("R1")).await.unwrap();

        let ids = |v: &[OdRequest]| v.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[actix_web::test]
    async fn student_without_register_number_cannot_list() {
        let engine = seeded_engine().await;

        let mut actor = student("R1");
        actor.register_no = None;

        let err = engine.list_for_role(&actor).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[actix_web::test]
    async fn hod_without_record_cannot_list() {
        let engine = seeded_engine().await;

        let err = engine
            .list_for_role(&hod("ghost@college.edu"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Reference(_)));
    }

    #[actix_web::test]
    async fn track_returns_all_requests_for_a_register_number() {
        let engine = seeded_engine().await;
        engine.submit(draft("R1")).await.unwrap();
        engine.submit(draft("R1")).await.unwrap();
        engine.submit(draft("R2")).await.unwrap();

        let tracked = engine.track("R1").await.unwrap();
        assert_eq!(tracked.len(), 2);

        assert!(engine.track("R9").await.unwrap().is_empty());
        assert!(matches!(
            engine.track("  ").await.unwrap_err(),
            WorkflowError::Validation(_)
        ));
    }

    #[actix_web::test]
    async fn reference_listings_cover_the_form_dropdowns() {
        let engine = seeded_engine().await;

        let departments = engine.departments().await.unwrap();
        assert_eq!(departments.len(), 2);

        let bca_faculty = engine.faculty(Some("BCA")).await.unwrap();
        assert_eq!(bca_faculty.len(), 1);
        assert_eq!(bca_faculty[0].email, FACULTY_EMAIL);

        assert!(engine.faculty(Some("BBA")).await.unwrap().is_empty());
        assert_eq!(engine.faculty(None).await.unwrap().len(), 1);
    }
}

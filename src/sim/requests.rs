//! Repair request queue and capability matching.

use super::types::{Capability, RequestId, SimError};

/// Lifecycle status of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Open,
    Assigned,
    InProgress,
    Complete,
}

/// What kind of demand created the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// An unscheduled failure at a severity level.
    Failure { level: u8 },
    /// A scheduled maintenance task (severity 0 for priority purposes).
    Maintenance { task: usize },
}

/// One unit of pending service demand.
#[derive(Debug, Clone)]
pub struct RepairRequest {
    pub id: RequestId,
    /// Index of the originating asset.
    pub asset: usize,
    /// Index of the originating subassembly within the asset.
    pub subassembly: usize,
    pub kind: RequestKind,
    /// Capability required to service the request.
    pub capability: Capability,
    /// Creation time in hours.
    pub created_h: f64,
    /// Service duration in hours.
    pub duration_h: f64,
    /// Materials cost billed on completion.
    pub materials_cost: f64,
    pub status: RequestStatus,
}

impl RepairRequest {
    /// Priority severity: a failure's level, or 0 for maintenance.
    pub fn severity(&self) -> u8 {
        match self.kind {
            RequestKind::Failure { level } => level,
            RequestKind::Maintenance { .. } => 0,
        }
    }
}

/// Queue of all live (`Open`/`Assigned`/`InProgress`) repair requests.
///
/// Priority is (severity descending, creation time ascending, id ascending).
/// Matching is a pure query; the dispatcher mutates status via [`assign`]
/// atomically with the match result so no two resources can claim the same
/// request even under a future parallel scheduler.
///
/// [`assign`]: RequestQueue::assign
#[derive(Debug, Default)]
pub struct RequestQueue {
    next_id: u64,
    requests: Vec<RepairRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an `Open` request and returns its id.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        asset: usize,
        subassembly: usize,
        kind: RequestKind,
        capability: Capability,
        created_h: f64,
        duration_h: f64,
        materials_cost: f64,
    ) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.requests.push(RepairRequest {
            id,
            asset,
            subassembly,
            kind,
            capability,
            created_h,
            duration_h,
            materials_cost,
            status: RequestStatus::Open,
        });
        id
    }

    pub fn get(&self, id: RequestId) -> Option<&RepairRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: RequestId) -> Option<&mut RepairRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// Number of live requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Highest-priority `Open` request serviceable with `capabilities`.
    ///
    /// Pure query; call [`assign`](Self::assign) with the result to claim it.
    /// Tow-to-port work never matches on-site equipment, a subassembly with
    /// another request already claimed is skipped (one in-progress repair per
    /// subassembly), an asset with a live tow request takes no new on-site
    /// work, and `asset_blocked` lets the caller exclude assets that are away
    /// under tow.
    pub fn match_for(
        &self,
        capabilities: &[Capability],
        asset_blocked: impl Fn(usize) -> bool,
    ) -> Option<RequestId> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Open)
            .filter(|r| r.capability != Capability::Tow)
            .filter(|r| capabilities.contains(&r.capability))
            .filter(|r| !asset_blocked(r.asset))
            .filter(|r| !self.asset_has_tow(r.asset))
            .filter(|r| !self.subassembly_claimed(r.asset, r.subassembly, r.id))
            .min_by(|a, b| {
                b.severity()
                    .cmp(&a.severity())
                    .then(a.created_h.total_cmp(&b.created_h))
                    .then(a.id.cmp(&b.id))
            })
            .map(|r| r.id)
    }

    fn subassembly_claimed(&self, asset: usize, subassembly: usize, except: RequestId) -> bool {
        self.requests.iter().any(|o| {
            o.asset == asset
                && o.subassembly == subassembly
                && o.id != except
                && matches!(o.status, RequestStatus::Assigned | RequestStatus::InProgress)
        })
    }

    /// Whether any other request on this asset is claimed or being worked.
    /// The port checks this before towing so a tow never rips an asset away
    /// from an in-flight on-site repair.
    pub fn asset_busy(&self, asset: usize, except: RequestId) -> bool {
        self.requests.iter().any(|o| {
            o.asset == asset
                && o.id != except
                && matches!(o.status, RequestStatus::Assigned | RequestStatus::InProgress)
        })
    }

    fn asset_has_tow(&self, asset: usize) -> bool {
        self.requests
            .iter()
            .any(|o| o.asset == asset && o.capability == Capability::Tow)
    }

    /// Number of `Open` requests a capability set could serve (excluding
    /// tow-to-port work). Used by the requests-threshold strategy.
    pub fn open_matchable(&self, capabilities: &[Capability]) -> usize {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Open)
            .filter(|r| r.capability != Capability::Tow)
            .filter(|r| capabilities.contains(&r.capability))
            .count()
    }

    /// Claims an `Open` request for a servicing resource.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DoubleAssignment`] if the request is not `Open` —
    /// a fatal defect, never silently corrected.
    pub fn assign(&mut self, id: RequestId) -> Result<(), SimError> {
        let request = self
            .get_mut(id)
            .ok_or_else(|| SimError::Inconsistency(format!("assigning unknown request {id}")))?;
        if request.status != RequestStatus::Open {
            return Err(SimError::DoubleAssignment(id));
        }
        request.status = RequestStatus::Assigned;
        Ok(())
    }

    /// Returns a superseded `Assigned` request to `Open` (equipment recalled
    /// before service started).
    pub fn release(&mut self, id: RequestId) {
        if let Some(request) = self.get_mut(id)
            && request.status == RequestStatus::Assigned
        {
            request.status = RequestStatus::Open;
        }
    }

    /// Transitions an `Assigned` request to `InProgress` at service start.
    ///
    /// # Errors
    ///
    /// Fatal if the request is not currently `Assigned`.
    pub fn start(&mut self, id: RequestId) -> Result<(), SimError> {
        let request = self
            .get_mut(id)
            .ok_or_else(|| SimError::Inconsistency(format!("starting unknown request {id}")))?;
        if request.status != RequestStatus::Assigned {
            return Err(SimError::Inconsistency(format!(
                "request {id} started while {:?}",
                request.status
            )));
        }
        request.status = RequestStatus::InProgress;
        Ok(())
    }

    /// Completes and destroys a request, returning its final record.
    pub fn complete(&mut self, id: RequestId) -> Option<RepairRequest> {
        let index = self.requests.iter().position(|r| r.id == id)?;
        let mut request = self.requests.remove(index);
        request.status = RequestStatus::Complete;
        Some(request)
    }

    /// Iterates over live requests in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &RepairRequest> {
        self.requests.iter()
    }
}

//! Settlement engine orchestration.
//!
//! Every fulfillment call runs the same pipeline over a staged view of the
//! state:
//!
//! ```text
//! admit ──> resolve criteria ──> activate ──> derive executions ──> transfer ──> commit
//!  │                              │
//!  │ time window, status,         │ fraction-scaled, interpolated amounts;
//!  │ signature, fill fraction     │ zone approval for restricted orders
//! ```
//!
//! Nothing reaches [`SettlementState`] until the transfer executor accepted
//! the whole batch, so a failure at any step leaves the state untouched.

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::criteria::apply_criteria_resolvers;
use crate::engine::request::{
    recipient_or_caller, CallContext, FulfillAvailableOrders, FulfillOrder, MatchOrders,
    SettlementOutcome,
};
use crate::engine::state::{SettlementState, StagedState, StateChanges};
use crate::error::SettlementError;
use crate::events::SettlementEvent;
use crate::fulfillment::{
    aggregate, aggregate_consideration_components, aggregate_offer_components,
    ensure_consideration_met, sweep_unspent_offer, ActiveOrder,
};
use crate::interfaces::{
    Ed25519Verifier, SignatureVerifier, StaticZoneRegistry, TransferExecutor, ZoneDecision,
    ZoneRegistry, ZoneValidation,
};
use crate::types::{
    apply_fraction, domain_separator, locate_current_amount, order_hash, short_hex,
    signing_digest, Address, AdvancedOrder, ConduitKey, CriteriaResolver, Execution, Hash,
    Order, OrderHash, OrderParameters, OrderStatus, ReceivedItem, SettlementReceipt, SpentItem,
    ZERO_WORD,
};

/// How unavailable orders are treated during admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdmissionMode {
    /// Any unavailable order fails the call
    Strict,
    /// Unavailable orders are skipped; at most `maximum_fulfilled` are filled
    Available { maximum_fulfilled: usize },
}

fn log_rejection(operation: &'static str, err: SettlementError) -> SettlementError {
    warn!(operation, error = %err, "call rejected");
    err
}

/// A truncated consideration list would hash to an unrelated order.
fn ensure_original_consideration(
    order_index: usize,
    parameters: &OrderParameters,
) -> Result<(), SettlementError> {
    if parameters.consideration.len() < parameters.total_original_consideration_items {
        return Err(SettlementError::MissingOriginalConsiderationItems {
            order_index,
            supplied: parameters.consideration.len(),
            required: parameters.total_original_consideration_items,
        });
    }
    Ok(())
}

/// The settlement engine.
///
/// Holds configuration and injected capabilities only; all persistent state
/// lives in the [`SettlementState`] passed to each call.
///
/// ## Example
///
/// ```
/// use dark_settlement::config::EngineConfig;
/// use dark_settlement::engine::{CallContext, SettlementEngine, SettlementState};
/// use dark_settlement::types::OrderParameters;
///
/// let engine = SettlementEngine::with_defaults(EngineConfig::default()).unwrap();
/// let mut state = SettlementState::new();
///
/// let offerer = [7u8; 32];
/// let params = OrderParameters::new(offerer, vec![], vec![], 0, 100);
/// let before = engine.order_hash(&state, &params).unwrap();
///
/// engine.increment_counter(&mut state, CallContext::new(offerer, 10)).unwrap();
/// assert_eq!(state.counter(&offerer), 1);
/// assert_ne!(engine.order_hash(&state, &params).unwrap(), before);
/// ```
pub struct SettlementEngine {
    config: EngineConfig,
    domain_separator: Hash,
    verifier: Box<dyn SignatureVerifier>,
    zones: Box<dyn ZoneRegistry>,
}

impl SettlementEngine {
    /// Create an engine with the given capabilities.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(
        config: EngineConfig,
        verifier: Box<dyn SignatureVerifier>,
        zones: Box<dyn ZoneRegistry>,
    ) -> Result<Self, SettlementError> {
        config.validate()?;
        let domain_separator = domain_separator(&config)?;
        debug!(name = %config.name, chain_id = config.chain_id, "settlement engine created");
        Ok(Self { config, domain_separator, verifier, zones })
    }

    /// Engine with Ed25519 signature checks and no zones registered
    pub fn with_defaults(config: EngineConfig) -> Result<Self, SettlementError> {
        Self::new(config, Box::new(Ed25519Verifier::new()), Box::new(StaticZoneRegistry::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn domain_separator(&self) -> &Hash {
        &self.domain_separator
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Hash of `parameters` under the offerer's current counter
    pub fn order_hash(
        &self,
        state: &SettlementState,
        parameters: &OrderParameters,
    ) -> Result<OrderHash, SettlementError> {
        ensure_original_consideration(0, parameters)?;
        order_hash(parameters, state.counter(&parameters.offerer))
    }

    /// Digest the offerer must sign for `parameters` to be fillable now
    pub fn signing_digest(
        &self,
        state: &SettlementState,
        parameters: &OrderParameters,
    ) -> Result<Hash, SettlementError> {
        let hash = self.order_hash(state, parameters)?;
        Ok(signing_digest(&self.domain_separator, &hash))
    }

    /// Current status of the order described by `parameters`
    pub fn order_status(
        &self,
        state: &SettlementState,
        parameters: &OrderParameters,
    ) -> Result<OrderStatus, SettlementError> {
        let hash = self.order_hash(state, parameters)?;
        Ok(state.order_status(&hash))
    }

    // ========================================================================
    // Fulfillment entry points
    // ========================================================================

    /// Fill a whole order that has no criteria items.
    ///
    /// Offer items go to the caller; the caller pays every consideration item
    /// through `fulfiller_conduit_key`.
    pub fn fulfill_basic_order(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: CallContext,
        order: Order,
        fulfiller_conduit_key: ConduitKey,
    ) -> Result<SettlementOutcome, SettlementError> {
        let request =
            FulfillOrder::new(AdvancedOrder::from(order)).with_conduit_key(fulfiller_conduit_key);
        self.run_fulfill_order(state, executor, &ctx, request)
            .map_err(|err| log_rejection("fulfill_basic_order", err))
    }

    /// Fill a fraction of one order, resolving criteria items.
    pub fn fulfill_order(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: CallContext,
        request: FulfillOrder,
    ) -> Result<SettlementOutcome, SettlementError> {
        self.run_fulfill_order(state, executor, &ctx, request)
            .map_err(|err| log_rejection("fulfill_order", err))
    }

    /// Fill whichever of the given orders are available.
    ///
    /// Cancelled, filled and inactive orders are skipped instead of failing
    /// the call, as are orders past `maximum_fulfilled`. Fails with
    /// `NoSpecifiedOrdersAvailable` if nothing can be filled.
    pub fn fulfill_available_orders(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: CallContext,
        request: FulfillAvailableOrders,
    ) -> Result<SettlementOutcome, SettlementError> {
        self.run_fulfill_available(state, executor, &ctx, request)
            .map_err(|err| log_rejection("fulfill_available_orders", err))
    }

    /// Match orders against each other using two-sided fulfillments.
    ///
    /// Offer amounts left after every fulfillment are swept to the request's
    /// recipient.
    pub fn match_orders(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: CallContext,
        request: MatchOrders,
    ) -> Result<SettlementOutcome, SettlementError> {
        self.run_match_orders(state, executor, &ctx, request)
            .map_err(|err| log_rejection("match_orders", err))
    }

    // ========================================================================
    // Lifecycle entry points
    // ========================================================================

    /// Check signatures ahead of time so later fills skip verification.
    pub fn validate(
        &self,
        state: &mut SettlementState,
        ctx: CallContext,
        orders: &[Order],
    ) -> Result<SettlementOutcome, SettlementError> {
        self.run_validate(state, &ctx, orders)
            .map_err(|err| log_rejection("validate", err))
    }

    /// Cancel orders. Only the offerer or the zone may cancel.
    ///
    /// Cancelling an already cancelled order is a no-op.
    pub fn cancel(
        &self,
        state: &mut SettlementState,
        ctx: CallContext,
        orders: &[OrderParameters],
    ) -> Result<SettlementOutcome, SettlementError> {
        self.run_cancel(state, &ctx, orders)
            .map_err(|err| log_rejection("cancel", err))
    }

    /// Increment the caller's counter, invalidating every order the caller
    /// signed under the previous value.
    pub fn increment_counter(
        &self,
        state: &mut SettlementState,
        ctx: CallContext,
    ) -> Result<SettlementOutcome, SettlementError> {
        let mut staged = StagedState::new(state);
        let counter = staged
            .counter(&ctx.caller)
            .checked_add(1)
            .ok_or(SettlementError::ArithmeticError("counter overflow"))
            .map_err(|err| log_rejection("increment_counter", err))?;
        staged.set_counter(ctx.caller, counter);
        let changes = staged.into_changes();

        let event = SettlementEvent::CounterIncremented { offerer: ctx.caller, counter };
        self.commit(state, changes, Vec::new(), Vec::new(), vec![event], 0, ctx.now)
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    fn check_batch_size(&self, count: usize) -> Result<(), SettlementError> {
        if count > self.config.max_orders_per_batch {
            return Err(SettlementError::TooManyOrders {
                count,
                max: self.config.max_orders_per_batch,
            });
        }
        Ok(())
    }

    fn verify_signature(
        &self,
        ctx: &CallContext,
        hash: &OrderHash,
        parameters: &OrderParameters,
        signature: &[u8],
    ) -> Result<(), SettlementError> {
        if ctx.caller == parameters.offerer {
            return Ok(());
        }
        let digest = signing_digest(&self.domain_separator, hash);
        if !self.verifier.verify(&digest, &parameters.offerer, signature) {
            return Err(SettlementError::InvalidSignature { order_hash: *hash });
        }
        Ok(())
    }

    /// Validate each order and stage its fill.
    ///
    /// On return, each working order's numerator/denominator holds the
    /// fraction actually filled in this call, or 0 if it was skipped.
    fn admit(
        &self,
        staged: &mut StagedState<'_>,
        ctx: &CallContext,
        orders: &mut [AdvancedOrder],
        mode: AdmissionMode,
    ) -> Result<Vec<OrderHash>, SettlementError> {
        let mut hashes = Vec::with_capacity(orders.len());
        let mut remaining = match mode {
            AdmissionMode::Strict => usize::MAX,
            AdmissionMode::Available { maximum_fulfilled } => maximum_fulfilled,
        };

        for (order_index, order) in orders.iter_mut().enumerate() {
            let parameters = &order.parameters;
            ensure_original_consideration(order_index, parameters)?;
            let hash = order_hash(parameters, staged.counter(&parameters.offerer))?;
            hashes.push(hash);

            // Cancellation outranks every other rejection
            let status = staged.order_status(&hash);
            if status.is_cancelled {
                if mode == AdmissionMode::Strict {
                    return Err(SettlementError::OrderIsCancelled { order_hash: hash });
                }
                debug!(order_index, order = %short_hex(&hash), "order cancelled, skipping");
                order.numerator = 0;
                continue;
            }

            let requested = order.requested_fraction();
            if requested.numerator == 0
                || requested.denominator == 0
                || requested.numerator > requested.denominator
            {
                return Err(SettlementError::BadFraction {
                    numerator: requested.numerator,
                    denominator: requested.denominator,
                });
            }
            if !parameters.order_type.allows_partial_fills() && !requested.is_whole() {
                return Err(SettlementError::PartialFillsNotEnabledForOrder { order_hash: hash });
            }

            if remaining == 0 {
                debug!(order_index, order = %short_hex(&hash), "maximum fulfilled reached, skipping");
                order.numerator = 0;
                continue;
            }

            let unavailable = if !parameters.is_active(ctx.now) {
                Some(SettlementError::InvalidTime {
                    start_time: parameters.start_time,
                    end_time: parameters.end_time,
                    now: ctx.now,
                })
            } else if status.is_fully_filled() {
                Some(SettlementError::OrderAlreadyFilled { order_hash: hash })
            } else {
                None
            };

            if let Some(err) = unavailable {
                if mode == AdmissionMode::Strict {
                    return Err(err);
                }
                debug!(order_index, order = %short_hex(&hash), reason = %err, "order unavailable, skipping");
                order.numerator = 0;
                continue;
            }

            if !status.is_validated {
                self.verify_signature(ctx, &hash, parameters, &order.signature)?;
            }

            let (fill, next) = status.apply_fill(requested, &hash)?;
            debug!(
                order_index,
                order = %short_hex(&hash),
                fill = %format!("{}/{}", fill.numerator, fill.denominator),
                total = %format!("{}/{}", next.numerator, next.denominator),
                "order admitted"
            );
            staged.set_order_status(hash, next);
            order.numerator = fill.numerator;
            order.denominator = fill.denominator;
            remaining -= 1;
        }

        Ok(hashes)
    }

    /// Derive the working amounts of an admitted order and run the zone check.
    fn activate(
        &self,
        ctx: &CallContext,
        order: &AdvancedOrder,
        hash: OrderHash,
    ) -> Result<ActiveOrder, SettlementError> {
        let parameters = &order.parameters;
        if order.numerator == 0 {
            return Ok(ActiveOrder::skipped(hash, parameters.offerer));
        }
        let (numerator, denominator) = (order.numerator, order.denominator);
        let (start_time, end_time) = (parameters.start_time, parameters.end_time);

        let offer = parameters
            .offer
            .iter()
            .map(|item| {
                let start = apply_fraction(item.start_amount, numerator, denominator)?;
                let end = apply_fraction(item.end_amount, numerator, denominator)?;
                Ok::<_, SettlementError>(SpentItem {
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier_or_criteria,
                    amount: locate_current_amount(start, end, start_time, end_time, ctx.now, false)?,
                })
            })
            .collect::<Result<Vec<_>, SettlementError>>()?;

        let consideration = parameters
            .consideration
            .iter()
            .map(|item| {
                let start = apply_fraction(item.start_amount, numerator, denominator)?;
                let end = apply_fraction(item.end_amount, numerator, denominator)?;
                Ok::<_, SettlementError>(ReceivedItem {
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier_or_criteria,
                    amount: locate_current_amount(start, end, start_time, end_time, ctx.now, true)?,
                    recipient: item.recipient,
                })
            })
            .collect::<Result<Vec<_>, SettlementError>>()?;

        let needs_zone = parameters.order_type.is_restricted()
            && ctx.caller != parameters.offerer
            && ctx.caller != parameters.zone;
        if needs_zone {
            let validation = ZoneValidation {
                order_hash: hash,
                caller: ctx.caller,
                offerer: parameters.offerer,
                offer: &offer,
                consideration: &consideration,
                zone_hash: parameters.zone_hash,
                extra_data: &order.extra_data,
            };
            let decision = self
                .zones
                .zone(&parameters.zone)
                .map(|zone| zone.validate_order(&validation))
                .unwrap_or(ZoneDecision::Reject);
            if decision != ZoneDecision::Accept {
                return Err(SettlementError::InvalidRestrictedOrder { order_hash: hash });
            }
            debug!(order = %short_hex(&hash), zone = %short_hex(&parameters.zone), "zone approved");
        }

        Ok(ActiveOrder {
            order_hash: hash,
            offerer: parameters.offerer,
            conduit_key: parameters.conduit_key,
            offer,
            consideration,
            available: true,
        })
    }

    /// Admit, resolve criteria and activate a batch of orders.
    fn prepare(
        &self,
        staged: &mut StagedState<'_>,
        ctx: &CallContext,
        orders: &mut [AdvancedOrder],
        resolvers: &[CriteriaResolver],
        mode: AdmissionMode,
    ) -> Result<(Vec<OrderHash>, Vec<ActiveOrder>), SettlementError> {
        let hashes = self.admit(staged, ctx, orders, mode)?;
        if mode != AdmissionMode::Strict && orders.iter().all(|order| order.numerator == 0) {
            return Err(SettlementError::NoSpecifiedOrdersAvailable);
        }
        apply_criteria_resolvers(orders, resolvers, self.config.max_proof_length)?;

        let active = orders
            .iter()
            .zip(&hashes)
            .map(|(order, hash)| self.activate(ctx, order, *hash))
            .collect::<Result<Vec<_>, SettlementError>>()?;
        Ok((hashes, active))
    }

    fn fulfilled_events(
        active: &[ActiveOrder],
        orders: &[AdvancedOrder],
        recipient: Address,
    ) -> Vec<SettlementEvent> {
        active
            .iter()
            .zip(orders)
            .filter(|(active, _)| active.available)
            .map(|(active, order)| SettlementEvent::OrderFulfilled {
                order_hash: active.order_hash,
                offerer: active.offerer,
                zone: order.parameters.zone,
                recipient,
                offer: active.offer.clone(),
                consideration: active.consideration.clone(),
            })
            .collect()
    }

    fn run_fulfill_order(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: &CallContext,
        request: FulfillOrder,
    ) -> Result<SettlementOutcome, SettlementError> {
        let recipient = recipient_or_caller(request.recipient, ctx);
        let mut orders = vec![request.order];

        let mut staged = StagedState::new(state);
        let (hashes, active) = self.prepare(
            &mut staged,
            ctx,
            &mut orders,
            &request.criteria_resolvers,
            AdmissionMode::Strict,
        )?;

        let events = Self::fulfilled_events(&active, &orders, recipient);
        let mut executions = Vec::new();
        for order in &active {
            for item in order.consideration.iter().filter(|item| item.amount > 0) {
                executions.push(Execution::new(item.clone(), ctx.caller, request.fulfiller_conduit_key));
            }
            for item in order.offer.iter().filter(|item| item.amount > 0) {
                executions.push(Execution::new(item.to_received(recipient), order.offerer, order.conduit_key));
            }
        }

        let statuses = Self::final_statuses(&staged, &hashes);
        let changes = staged.into_changes();
        self.dispatch(executor, &executions)?;
        self.commit(state, changes, executions, statuses, events, active.len(), ctx.now)
    }

    fn run_fulfill_available(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: &CallContext,
        request: FulfillAvailableOrders,
    ) -> Result<SettlementOutcome, SettlementError> {
        self.check_batch_size(request.orders.len())?;
        let recipient = recipient_or_caller(request.recipient, ctx);
        let mut orders = request.orders;
        if orders.is_empty() {
            return Err(SettlementError::NoSpecifiedOrdersAvailable);
        }

        let mut staged = StagedState::new(state);
        let (hashes, mut active) = self.prepare(
            &mut staged,
            ctx,
            &mut orders,
            &request.criteria_resolvers,
            AdmissionMode::Available { maximum_fulfilled: request.maximum_fulfilled },
        )?;
        let events = Self::fulfilled_events(&active, &orders, recipient);

        let mut executions = Vec::new();
        for (index, components) in request.consideration_fulfillments.iter().enumerate() {
            if let Some(execution) = aggregate_consideration_components(
                &mut active,
                components,
                index,
                ctx.caller,
                request.fulfiller_conduit_key,
            )? {
                executions.push(execution);
            }
        }
        for (index, components) in request.offer_fulfillments.iter().enumerate() {
            if let Some(execution) = aggregate_offer_components(&mut active, components, index, recipient)? {
                executions.push(execution);
            }
        }
        ensure_consideration_met(&active)?;
        executions.retain(|execution| !execution.is_self_transfer());

        let fulfilled = active.iter().filter(|order| order.available).count();
        let statuses = Self::final_statuses(&staged, &hashes);
        let changes = staged.into_changes();
        self.dispatch(executor, &executions)?;
        self.commit(state, changes, executions, statuses, events, fulfilled, ctx.now)
    }

    fn run_match_orders(
        &self,
        state: &mut SettlementState,
        executor: &mut dyn TransferExecutor,
        ctx: &CallContext,
        request: MatchOrders,
    ) -> Result<SettlementOutcome, SettlementError> {
        self.check_batch_size(request.orders.len())?;
        let recipient = recipient_or_caller(request.recipient, ctx);
        let mut orders = request.orders;

        let mut staged = StagedState::new(state);
        let (hashes, mut active) = self.prepare(
            &mut staged,
            ctx,
            &mut orders,
            &request.criteria_resolvers,
            AdmissionMode::Strict,
        )?;
        let mut events = Self::fulfilled_events(&active, &orders, ZERO_WORD);
        events.push(SettlementEvent::OrdersMatched { order_hashes: hashes.clone() });

        let mut executions = Vec::new();
        for (index, fulfillment) in request.fulfillments.iter().enumerate() {
            if let Some(execution) = aggregate(&mut active, fulfillment, index)? {
                executions.push(execution);
            }
        }
        ensure_consideration_met(&active)?;
        executions.extend(sweep_unspent_offer(&mut active, recipient));
        executions.retain(|execution| !execution.is_self_transfer());

        let statuses = Self::final_statuses(&staged, &hashes);
        let changes = staged.into_changes();
        self.dispatch(executor, &executions)?;
        self.commit(state, changes, executions, statuses, events, active.len(), ctx.now)
    }

    fn run_validate(
        &self,
        state: &mut SettlementState,
        ctx: &CallContext,
        orders: &[Order],
    ) -> Result<SettlementOutcome, SettlementError> {
        self.check_batch_size(orders.len())?;
        let mut staged = StagedState::new(state);
        let mut hashes = Vec::with_capacity(orders.len());
        let mut events = Vec::new();

        for (order_index, order) in orders.iter().enumerate() {
            let parameters = &order.parameters;
            ensure_original_consideration(order_index, parameters)?;
            let hash = order_hash(parameters, staged.counter(&parameters.offerer))?;
            hashes.push(hash);

            let mut status = staged.order_status(&hash);
            if status.is_cancelled {
                return Err(SettlementError::OrderIsCancelled { order_hash: hash });
            }
            if status.is_fully_filled() {
                return Err(SettlementError::OrderAlreadyFilled { order_hash: hash });
            }
            if status.is_validated {
                continue;
            }

            self.verify_signature(ctx, &hash, parameters, &order.signature)?;
            status.is_validated = true;
            staged.set_order_status(hash, status);
            events.push(SettlementEvent::OrderValidated {
                order_hash: hash,
                offerer: parameters.offerer,
                zone: parameters.zone,
            });
        }

        let statuses = Self::final_statuses(&staged, &hashes);
        let changes = staged.into_changes();
        self.commit(state, changes, Vec::new(), statuses, events, 0, ctx.now)
    }

    fn run_cancel(
        &self,
        state: &mut SettlementState,
        ctx: &CallContext,
        orders: &[OrderParameters],
    ) -> Result<SettlementOutcome, SettlementError> {
        self.check_batch_size(orders.len())?;
        let mut staged = StagedState::new(state);
        let mut hashes = Vec::with_capacity(orders.len());
        let mut events = Vec::new();

        for (order_index, parameters) in orders.iter().enumerate() {
            ensure_original_consideration(order_index, parameters)?;
            let hash = order_hash(parameters, staged.counter(&parameters.offerer))?;
            hashes.push(hash);

            if ctx.caller != parameters.offerer && ctx.caller != parameters.zone {
                return Err(SettlementError::InvalidCanceller { order_hash: hash });
            }
            let mut status = staged.order_status(&hash);
            if status.is_cancelled {
                continue;
            }
            if status.is_fully_filled() {
                return Err(SettlementError::OrderAlreadyFilled { order_hash: hash });
            }

            status.is_cancelled = true;
            staged.set_order_status(hash, status);
            events.push(SettlementEvent::OrderCancelled {
                order_hash: hash,
                offerer: parameters.offerer,
                zone: parameters.zone,
            });
        }

        let statuses = Self::final_statuses(&staged, &hashes);
        let changes = staged.into_changes();
        self.commit(state, changes, Vec::new(), statuses, events, 0, ctx.now)
    }

    // ========================================================================
    // Commit
    // ========================================================================

    fn final_statuses(staged: &StagedState<'_>, hashes: &[OrderHash]) -> Vec<(OrderHash, OrderStatus)> {
        hashes.iter().map(|hash| (*hash, staged.order_status(hash))).collect()
    }

    fn dispatch(
        &self,
        executor: &mut dyn TransferExecutor,
        executions: &[Execution],
    ) -> Result<(), SettlementError> {
        for execution in executions {
            debug!(transfer = %execution.summary(), "dispatching");
        }
        executor.execute_batch(executions)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn commit(
        &self,
        state: &mut SettlementState,
        changes: StateChanges,
        executions: Vec<Execution>,
        statuses: Vec<(OrderHash, OrderStatus)>,
        events: Vec<SettlementEvent>,
        orders_fulfilled: usize,
        now: u64,
    ) -> Result<SettlementOutcome, SettlementError> {
        let batch_id = state.apply(changes);
        let state_root = state.state_root()?;
        let receipt = SettlementReceipt::new(
            batch_id,
            orders_fulfilled as u64,
            executions.len() as u64,
            state_root,
            now,
        );

        info!(
            batch_id,
            orders = orders_fulfilled,
            executions = executions.len(),
            events = events.len(),
            state_root = %short_hex(&state_root),
            "batch committed"
        );
        for event in &events {
            debug!(event = %event.summary(), "settlement event");
        }

        Ok(SettlementOutcome { executions, statuses, events, receipt })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

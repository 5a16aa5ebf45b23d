//! Trade authorization and cap enforcement.
//!
//! [`AuthorizationVerifier`] is the component the execution engine calls
//! after every trade against a bootstrapping market. It composes the signer
//! registry, cap store, replay guard, purchase ledger and price quoter into a
//! single short-circuiting guard chain, and exposes the administrative and
//! read-only operations around them.

use crate::caps::CapConfigStore;
use crate::collaborators::{AssetRegistry, BootstrapSource};
use crate::error::GuardError;
use crate::event_bus::EventBus;
use crate::ledger::PurchaseLedger;
use crate::market::MarketLayout;
use crate::origin::OriginResolver;
use crate::quoter::PriceQuoter;
use crate::reentrancy::non_reentrant;
use crate::registry::SignerRegistry;
use crate::replay::ReplayGuard;
use alloy_primitives::{Address, PrimitiveSignature, B256, U256};
use launch_config::GuardConfig;
use launch_storage::{StorageService, WriteBatch};
use launch_types::{
	authorization_digest, truncate_id, AuthorizationToken, CapConfig, GuardEvent, MarketId,
	MarketKey, SignerOverride, SignerPolicy, TradeContext, TradeParams,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

/// Identity and trust anchors of a verifier instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardSettings {
	/// Policy address markets must be attached to.
	pub address: Address,
	/// The only account allowed to notify trades and set cap configs.
	pub engine: Address,
	/// The only account allowed to change the global trusted set.
	pub admin: Address,
	/// Bound on the caller-identity probe.
	pub probe_timeout: Duration,
}

impl From<&GuardConfig> for GuardSettings {
	fn from(config: &GuardConfig) -> Self {
		Self {
			address: config.address,
			engine: config.engine,
			admin: config.admin,
			probe_timeout: Duration::from_millis(config.probe_timeout_ms),
		}
	}
}

/// Result of a successful trade notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeOutcome {
	/// The market's cap config is disabled; nothing was checked or recorded.
	Unchecked,
	/// The trade passed every check and was recorded.
	Authorized {
		/// Resolved initiating account.
		origin: Address,
		/// Estimated launched-asset units credited to the account.
		amount: U256,
		/// Account's cumulative total after this trade.
		total: U256,
		/// Consumed token fingerprint, if a signature was required.
		fingerprint: Option<B256>,
	},
}

/// The bootstrap purchase authorization engine.
pub struct AuthorizationVerifier {
	settings: GuardSettings,
	storage: Arc<StorageService>,
	signers: SignerRegistry,
	caps: CapConfigStore,
	replay: ReplayGuard,
	ledger: PurchaseLedger,
	quoter: PriceQuoter,
	origins: OriginResolver,
	assets: Arc<dyn AssetRegistry>,
	event_bus: EventBus,
	/// Serializes state mutations the way the host platform serializes
	/// transactions. Never held across a collaborator call.
	tx_lock: Mutex<()>,
}

impl AuthorizationVerifier {
	pub fn new(
		settings: GuardSettings,
		storage: Arc<StorageService>,
		source: Arc<dyn BootstrapSource>,
		assets: Arc<dyn AssetRegistry>,
		origins: OriginResolver,
		event_bus: EventBus,
	) -> Self {
		Self {
			settings,
			signers: SignerRegistry::new(storage.clone()),
			caps: CapConfigStore::new(storage.clone()),
			replay: ReplayGuard::new(storage.clone()),
			ledger: PurchaseLedger::new(storage.clone()),
			quoter: PriceQuoter::new(source),
			storage,
			origins,
			assets,
			event_bus,
			tx_lock: Mutex::new(()),
		}
	}

	pub fn settings(&self) -> &GuardSettings {
		&self.settings
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Runs the guard chain for one trade.
	///
	/// Market layout, origin and the purchase estimate are resolved before the
	/// transaction lock is taken, so a collaborator may call back into the
	/// verifier. Every check
	/// completes before anything is written; the ledger increment and the
	/// replay mark are then committed in one batch.
	#[instrument(skip_all, fields(market = %truncate_id(&key.id().to_string())))]
	pub async fn notify_trade(
		&self,
		ctx: &TradeContext,
		key: &MarketKey,
		params: &TradeParams,
		hook_data: &[u8],
	) -> Result<TradeOutcome, GuardError> {
		if ctx.caller != self.settings.engine {
			tracing::warn!(caller = %ctx.caller, "Trade notification from unauthorized caller");
			return Err(GuardError::Unauthorized);
		}
		key.validate(self.settings.address)?;
		let market = key.id();

		if !self.caps.get(&market).await?.enabled {
			tracing::trace!("Cap config disabled, skipping checks");
			return Ok(TradeOutcome::Unchecked);
		}

		let layout = MarketLayout::resolve(key, self.assets.as_ref()).await?;
		let origin = self.origins.resolve(ctx).await;
		let amount = if params.is_purchase(layout.native_is_first) {
			self.quoter
				.estimate_received(&market, params.amount_specified, layout.native_is_first)
				.await?
		} else {
			U256::ZERO
		};

		let _tx = self.tx_lock.lock().await;

		// Re-read under the lock; a callback may have replaced the config.
		let config = self.caps.get(&market).await?;
		if !config.enabled {
			return Ok(TradeOutcome::Unchecked);
		}

		let mut batch = WriteBatch::new();
		let policy = self.signers.resolve_policy(&market).await?;
		let fingerprint = if policy.requires_signature() {
			let fingerprint = self.verify_token(ctx, policy, origin, hook_data).await?;
			self.replay.consume(&mut batch, &fingerprint, origin)?;
			Some(fingerprint)
		} else {
			None
		};

		let total = match self
			.ledger
			.record_and_check(&mut batch, &market, origin, &config, amount)
			.await
		{
			Ok(total) => total,
			Err(e) => {
				tracing::warn!(account = %origin, %amount, error = %e, "Trade rejected");
				return Err(e);
			},
		};

		self.storage.commit(batch).await?;

		if let Some(fingerprint) = fingerprint {
			self.event_bus
				.publish(GuardEvent::AuthorizationConsumed { fingerprint, origin });
		}
		self.event_bus.publish(GuardEvent::PurchaseRecorded {
			market,
			account: origin,
			amount,
			total,
		});
		tracing::debug!(account = %origin, %amount, %total, "Trade authorized");

		Ok(TradeOutcome::Authorized {
			origin,
			amount,
			total,
			fingerprint,
		})
	}

	/// Decodes, dates and verifies the trade's token. Returns the token
	/// fingerprint.
	async fn verify_token(
		&self,
		ctx: &TradeContext,
		policy: SignerPolicy,
		origin: Address,
		hook_data: &[u8],
	) -> Result<B256, GuardError> {
		let token = AuthorizationToken::from_hook_data(hook_data).map_err(|e| {
			tracing::warn!(error = %e, "No authorization token in trade data");
			GuardError::MissingAuthorization
		})?;

		if token.deadline < U256::from(ctx.timestamp) {
			tracing::warn!(deadline = %token.deadline, now = ctx.timestamp, "Authorization expired");
			return Err(GuardError::DeadlineExpired {
				deadline: token.deadline,
				now: ctx.timestamp,
			});
		}

		let fingerprint = authorization_digest(origin, token.deadline);
		if self.replay.has_been_consumed(&fingerprint).await? {
			tracing::warn!(account = %origin, "Authorization replayed");
			return Err(GuardError::TokenAlreadyUsed);
		}

		let signer = recover_signer(&token, &fingerprint)?;
		if let Err(e) = self.signers.authorize(policy, signer).await {
			tracing::warn!(account = %origin, %signer, "Authorization signed by unaccepted signer");
			return Err(e);
		}

		Ok(fingerprint)
	}

	/// Stores the cap configuration for a new market.
	pub async fn set_config(
		&self,
		caller: Address,
		key: &MarketKey,
		blob: &[u8],
	) -> Result<CapConfig, GuardError> {
		if caller != self.settings.engine {
			return Err(GuardError::Unauthorized);
		}
		key.validate(self.settings.address)?;
		let market = key.id();

		let _tx = self.tx_lock.lock().await;
		let config = self.caps.set(&market, blob).await?;
		tracing::info!(
			market = %truncate_id(&market.to_string()),
			enabled = config.enabled,
			per_account_cap = %config.per_account_cap,
			per_trade_cap = %config.per_trade_cap,
			"Cap config set"
		);
		self.event_bus
			.publish(GuardEvent::CapConfigSet { market, config });
		Ok(config)
	}

	pub async fn add_trusted_signer(
		&self,
		caller: Address,
		signer: Address,
	) -> Result<(), GuardError> {
		if caller != self.settings.admin {
			return Err(GuardError::Unauthorized);
		}
		let _tx = self.tx_lock.lock().await;
		self.signers.add(signer).await?;
		tracing::info!(%signer, "Trusted signer added");
		self.event_bus
			.publish(GuardEvent::TrustedSignerAdded { signer });
		Ok(())
	}

	pub async fn remove_trusted_signer(
		&self,
		caller: Address,
		signer: Address,
	) -> Result<(), GuardError> {
		if caller != self.settings.admin {
			return Err(GuardError::Unauthorized);
		}
		let _tx = self.tx_lock.lock().await;
		self.signers.remove(signer).await?;
		tracing::info!(%signer, "Trusted signer removed");
		self.event_bus
			.publish(GuardEvent::TrustedSignerRemoved { signer });
		Ok(())
	}

	pub async fn is_trusted_signer(&self, signer: Address) -> Result<bool, GuardError> {
		self.signers.is_trusted(signer).await
	}

	/// Pins the market's signer, or disables signature checks with `None`.
	///
	/// Only the launched asset's creator may call this. The creator lookup
	/// runs inside a non-reentrant section: a nested call from the lookup
	/// fails with [`GuardError::Reentrancy`].
	pub async fn set_market_signer(
		&self,
		caller: Address,
		key: &MarketKey,
		signer: Option<Address>,
	) -> Result<SignerOverride, GuardError> {
		non_reentrant(async {
			key.validate(self.settings.address)?;

			let layout = MarketLayout::resolve(key, self.assets.as_ref()).await?;
			if caller != layout.creator {
				tracing::warn!(%caller, creator = %layout.creator, "Market signer change by non-creator");
				return Err(GuardError::Unauthorized);
			}

			let market = key.id();
			let _tx = self.tx_lock.lock().await;
			let record = self.signers.set_market_override(&market, signer).await?;
			tracing::info!(
				market = %truncate_id(&market.to_string()),
				signer = ?signer,
				"Market signer set"
			);
			self.event_bus
				.publish(GuardEvent::MarketSignerSet { market, signer });
			Ok(record)
		})
		.await
	}

	pub async fn market_signer(
		&self,
		market: &MarketId,
	) -> Result<Option<SignerOverride>, GuardError> {
		self.signers.market_override(market).await
	}

	pub async fn signer_policy(&self, market: &MarketId) -> Result<SignerPolicy, GuardError> {
		self.signers.resolve_policy(market).await
	}

	pub async fn cap_config(&self, market: &MarketId) -> Result<CapConfig, GuardError> {
		self.caps.get(market).await
	}

	pub async fn purchased(&self, market: &MarketId, account: Address) -> Result<U256, GuardError> {
		self.ledger.purchased(market, account).await
	}

	pub async fn has_been_consumed(&self, fingerprint: &B256) -> Result<bool, GuardError> {
		self.replay.has_been_consumed(fingerprint).await
	}

	/// `(has_cap, remaining)` for an account.
	///
	/// `has_cap` is false when the market is disabled or has no account cap,
	/// in which case `remaining` is zero. Overshoot reads as zero here.
	pub async fn remaining_cap(
		&self,
		market: &MarketId,
		account: Address,
	) -> Result<(bool, U256), GuardError> {
		let config = self.caps.get(market).await?;
		if !config.enabled || config.per_account_cap.is_zero() {
			return Ok((false, U256::ZERO));
		}
		let purchased = self.ledger.purchased(market, account).await?;
		Ok((true, config.per_account_cap.saturating_sub(purchased)))
	}

	/// The guard never adjusts fees.
	pub fn determine_swap_fee(&self, _key: &MarketKey, _params: &TradeParams, base_fee: u32) -> u32 {
		base_fee
	}
}

fn recover_signer(token: &AuthorizationToken, digest: &B256) -> Result<Address, GuardError> {
	let signature = PrimitiveSignature::try_from(token.signature.as_ref())
		.map_err(|_| GuardError::InvalidSigner)?;
	signature
		.recover_address_from_prehash(digest)
		.map_err(|_| GuardError::InvalidSigner)
}

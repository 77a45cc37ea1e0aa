//! One wallet's view of the game: queries and lock-guarded operations.

use serde::Serialize;
use sol_wire::{Keypair, Pubkey};
use tracing::{info, warn};

use crate::addresses::{AddressBook, ProgramAddresses, TokenAccounts};
use crate::codec::{
    check_discriminator, decode_global_state, decode_player_data, GLOBAL_STATE_DISCRIMINATOR,
    PLAYER_DISCRIMINATOR,
};
use crate::config::WalletConfig;
use crate::error::{ClientError, StepOutcome};
use crate::instructions::InstructionBuilder;
use crate::ledger::LedgerClient;
use crate::lock::OperationLock;
use crate::orchestrator::{Orchestrator, StepRunner, TxOutcome};
use crate::reward::{self, PendingReward, RewardInputs};
use crate::state::{rarity, ActiveCard, GlobalStateRecord, PlayerRecord};

/// How `init_game_account` spends the starter cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitStrategy {
    /// Buy the farm, then stake slots 0 and 1.
    #[default]
    StakeStarters,
    /// Buy the farm and recycle slot 1. Stake the card that lands in the
    /// last occupied slot alongside slot 0 if it is rare or better,
    /// otherwise stake slot 0 alone.
    RecycleFirst,
}

/// What a UI shows for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub cards: Vec<ActiveCard>,
    pub card_count: u8,
    pub berries: u64,
    pub total_hashpower: u64,
    pub pending_reward: PendingReward,
    pub has_pending_action: bool,
}

pub struct WalletHandle<L> {
    orchestrator: Orchestrator<L>,
    addresses: AddressBook,
    builder: InstructionBuilder,
    lock: OperationLock,
}

impl<L: LedgerClient> WalletHandle<L> {
    /// Import `private_key` (Base58) and derive every address.
    pub fn new(private_key: &str, config: &WalletConfig, ledger: L) -> Result<Self, ClientError> {
        let accounts = config.validate()?;
        let keypair =
            Keypair::from_base58(private_key).map_err(|e| ClientError::InvalidPrivateKey(e.to_string()))?;
        let wallet = keypair.pubkey();

        let addresses = AddressBook::new(wallet, accounts)?;
        let builder = InstructionBuilder::new(wallet, accounts, *addresses.program(), &config.tx);
        info!(%wallet, "wallet handle created");

        Ok(Self {
            orchestrator: Orchestrator::new(ledger, keypair, config.tx.clone()),
            addresses,
            builder,
            lock: OperationLock::new(),
        })
    }

    pub fn public_key(&self) -> Pubkey {
        self.addresses.wallet()
    }

    pub fn program_addresses(&self) -> &ProgramAddresses {
        self.addresses.program()
    }

    pub fn operation_lock(&self) -> &OperationLock {
        &self.lock
    }

    pub fn ledger(&self) -> &L {
        self.orchestrator.ledger()
    }

    /// Resolve the associated token addresses. Idempotent.
    pub async fn ensure_ready(&self) -> Result<TokenAccounts, ClientError> {
        self.addresses.ensure_ready().await
    }

    // -----------------------------------------------------------------------
    // Queries (no lock)
    // -----------------------------------------------------------------------

    /// The player account, or `None` before `init_game_account`.
    ///
    /// A referrer recorded in the account replaces the configured one.
    pub async fn player_account(&self) -> Result<Option<PlayerRecord>, ClientError> {
        let address = self.addresses.program().player;
        let Some(account) = self.orchestrator.fetch_account(&address).await? else {
            return Ok(None);
        };
        check_discriminator(&account.data, &PLAYER_DISCRIMINATOR, "Player")?;
        let player = decode_player_data(&account.data)?;
        if let Some(referrer) = player.referrer {
            self.addresses.refresh_referrer(referrer).await?;
        }
        Ok(Some(player))
    }

    pub async fn global_state(&self) -> Result<GlobalStateRecord, ClientError> {
        let address = self.addresses.program().global_state;
        let account = self
            .orchestrator
            .fetch_account(&address)
            .await?
            .ok_or_else(|| ClientError::PreconditionFailed(format!("global state {address} not found")))?;
        check_discriminator(&account.data, &GLOBAL_STATE_DISCRIMINATOR, "GlobalState")?;
        decode_global_state(&account.data)
    }

    /// Token balance of the player's token account; 0 if it does not exist.
    pub async fn token_balance(&self) -> Result<u64, ClientError> {
        let tokens = self.ensure_ready().await?;
        let ledger = self.orchestrator.ledger();
        let balance = self
            .orchestrator
            .fetch("token balance", ledger.token_account_balance(&tokens.player))
            .await?;
        Ok(balance.unwrap_or(0))
    }

    /// Native balance in lamports.
    pub async fn native_balance(&self) -> Result<u64, ClientError> {
        let wallet = self.public_key();
        let ledger = self.orchestrator.ledger();
        self.orchestrator.fetch("native balance", ledger.balance(&wallet)).await
    }

    pub async fn current_slot(&self) -> Result<u64, ClientError> {
        let ledger = self.orchestrator.ledger();
        self.orchestrator.fetch("slot", ledger.slot()).await
    }

    pub async fn pending_reward(&self) -> Result<PendingReward, ClientError> {
        let player = self.require_player().await?;
        self.pending_reward_for(&player).await
    }

    async fn pending_reward_for(&self, player: &PlayerRecord) -> Result<PendingReward, ClientError> {
        let global = self.global_state().await?;
        let slot = self.current_slot().await?;
        let decimals = self.orchestrator.settings().token_decimals;
        Ok(reward::estimate(&RewardInputs::new(player, &global, slot), decimals))
    }

    /// `None` before `init_game_account`.
    pub async fn account_summary(&self) -> Result<Option<AccountSummary>, ClientError> {
        let Some(player) = self.player_account().await? else {
            return Ok(None);
        };
        let pending_reward = self.pending_reward_for(&player).await?;
        Ok(Some(AccountSummary {
            cards: player.active_cards(),
            card_count: player.card_count,
            berries: player.berries,
            total_hashpower: player.total_hashpower,
            pending_reward,
            has_pending_action: player.pending_action.is_pending(),
        }))
    }

    async fn require_player(&self) -> Result<PlayerRecord, ClientError> {
        self.player_account().await?.ok_or_else(|| {
            ClientError::PreconditionFailed("game account not initialized".into())
        })
    }

    // -----------------------------------------------------------------------
    // Operations (under the lock)
    // -----------------------------------------------------------------------

    /// Buy the starter farm and stake per `strategy`.
    pub async fn init_game_account(&self, strategy: InitStrategy) -> Result<Vec<StepOutcome>, ClientError> {
        let _guard = self.lock.acquire().await;
        let tokens = self.ensure_ready().await?;
        if self.player_account().await?.is_some() {
            return Err(ClientError::PreconditionFailed(
                "game account already initialized".into(),
            ));
        }
        let settings = self.orchestrator.settings();
        let mut run = StepRunner::new(&self.orchestrator, "init_game_account");

        run.step(
            "purchase_initial_farm",
            &self.builder.with_compute_budget([self.builder.purchase_initial_farm(&tokens)]),
        )
        .await?;
        run.pause(settings.inter_step_delay()).await;

        let to_stake: Vec<u8> = match strategy {
            InitStrategy::StakeStarters => vec![0, 1],
            InitStrategy::RecycleFirst => {
                run.step(
                    "recycle_commit",
                    &self.builder.with_compute_budget([self.builder.recycle_cards_commit(&[1])?]),
                )
                .await?;
                run.pause(settings.commit_settle_delay()).await;
                run.step(
                    "recycle_settle",
                    &self.builder.with_compute_budget([self.builder.recycle_cards_settle()]),
                )
                .await?;
                run.pause(settings.inter_step_delay()).await;

                let player = match self.require_player().await {
                    Ok(player) => player,
                    Err(e) => return Err(run.fail("read_player", e)),
                };
                let slot = player.last_occupied_slot();
                let card = slot.and_then(|s| player.card(s).copied());
                match (slot, card) {
                    (Some(slot), Some(card)) if slot != 0 && card.rarity >= rarity::RARE => {
                        info!(slot, rarity = card.rarity, "recycle produced a rare card, staking it");
                        vec![0, slot]
                    }
                    _ => vec![0],
                }
            }
        };

        for (i, slot) in to_stake.iter().enumerate() {
            if i > 0 {
                run.pause(settings.inter_step_delay()).await;
            }
            run.step(
                "stake_card",
                &self.builder.with_compute_budget([self.builder.stake_card(&tokens, *slot)]),
            )
            .await?;
        }
        Ok(run.finish())
    }

    /// Commit to a booster pack, wait, then settle it.
    pub async fn open_booster(&self) -> Result<Vec<StepOutcome>, ClientError> {
        let _guard = self.lock.acquire().await;
        let player = self.require_player().await?;
        player.check_can_open_booster()?;
        let global = self.global_state().await?;
        global.check_production_enabled()?;
        let balance = self.token_balance().await?;
        if balance < global.booster_pack_cost_microtokens {
            return Err(ClientError::PreconditionFailed(format!(
                "booster costs {} base units, balance is {balance}",
                global.booster_pack_cost_microtokens
            )));
        }
        // Read after the player fetch so a new referrer is already applied.
        let tokens = self.ensure_ready().await?;

        let mut run = StepRunner::new(&self.orchestrator, "open_booster");
        run.step(
            "open_booster_commit",
            &self.builder.with_compute_budget([self.builder.open_booster_commit(&tokens)]),
        )
        .await?;
        run.pause(self.orchestrator.settings().commit_settle_delay()).await;
        run.step(
            "settle_open_booster",
            &self.builder.with_compute_budget([self.builder.settle_open_booster()]),
        )
        .await?;
        Ok(run.finish())
    }

    /// Claim rewards, then sweep the whole token balance to the recipient.
    ///
    /// The sweep is skipped when the balance is zero or the recipient has
    /// no token account; the returned list then holds only the claim.
    pub async fn claim_reward(&self) -> Result<Vec<StepOutcome>, ClientError> {
        let _guard = self.lock.acquire().await;
        let tokens = self.ensure_ready().await?;
        self.require_player().await?;

        let mut run = StepRunner::new(&self.orchestrator, "claim_reward");
        run.step(
            "claim_rewards",
            &self.builder.with_compute_budget([self.builder.claim_rewards(&tokens)]),
        )
        .await?;

        let balance = match self.token_balance().await {
            Ok(balance) => balance,
            Err(e) => return Err(run.fail("read_balance", e)),
        };
        if balance == 0 {
            info!("nothing to sweep after claim");
            return Ok(run.finish());
        }
        match self.orchestrator.fetch_account(&tokens.recipient).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(recipient = %tokens.recipient, "recipient token account missing, sweep skipped");
                return Ok(run.finish());
            }
            Err(e) => return Err(run.fail("read_recipient", e)),
        }

        let sweep = self.builder.sweep_to_recipient(&tokens, balance)?;
        run.step("sweep_to_recipient", &self.builder.with_compute_budget([sweep]))
            .await?;
        Ok(run.finish())
    }

    pub async fn stake_card(&self, card_index: u8) -> Result<TxOutcome, ClientError> {
        let _guard = self.lock.acquire().await;
        self.require_player().await?.check_can_stake(card_index)?;
        let tokens = self.ensure_ready().await?;
        let ix = self.builder.stake_card(&tokens, card_index);
        self.orchestrator
            .submit("stake_card", &self.builder.with_compute_budget([ix]))
            .await
    }

    pub async fn unstake_card(&self, card_index: u8) -> Result<TxOutcome, ClientError> {
        let _guard = self.lock.acquire().await;
        self.require_player().await?.check_can_unstake(card_index)?;
        let tokens = self.ensure_ready().await?;
        let ix = self.builder.unstake_card(&tokens, card_index);
        self.orchestrator
            .submit("unstake_card", &self.builder.with_compute_budget([ix]))
            .await
    }

    pub async fn recycle_card(&self, card_index: u8) -> Result<Vec<StepOutcome>, ClientError> {
        self.recycle_cards(&[card_index]).await
    }

    /// Commit a recycle of `card_indices`, wait, then settle it.
    pub async fn recycle_cards(&self, card_indices: &[u8]) -> Result<Vec<StepOutcome>, ClientError> {
        let _guard = self.lock.acquire().await;
        self.require_player().await?.check_can_recycle(card_indices)?;
        self.ensure_ready().await?;
        let commit = self.builder.recycle_cards_commit(card_indices)?;

        let mut run = StepRunner::new(&self.orchestrator, "recycle_cards");
        run.step("recycle_commit", &self.builder.with_compute_budget([commit]))
            .await?;
        run.pause(self.orchestrator.settings().commit_settle_delay()).await;
        run.step(
            "recycle_settle",
            &self.builder.with_compute_budget([self.builder.recycle_cards_settle()]),
        )
        .await?;
        Ok(run.finish())
    }

    /// Drop a commit whose settle never went through.
    pub async fn cancel_pending_action(&self) -> Result<TxOutcome, ClientError> {
        let _guard = self.lock.acquire().await;
        let player = self.require_player().await?;
        let slot = self.current_slot().await?;
        player.check_can_cancel(slot)?;
        self.ensure_ready().await?;
        let ix = self.builder.cancel_pending_action();
        self.orchestrator
            .submit("cancel_pending_action", &self.builder.with_compute_budget([ix]))
            .await
    }

    /// Send `amount` base units to the recipient's token account, creating
    /// that account first if needed.
    pub async fn transfer_tokens(&self, amount: u64) -> Result<TxOutcome, ClientError> {
        let _guard = self.lock.acquire().await;
        if amount == 0 {
            return Err(ClientError::PreconditionFailed("amount must be > 0".into()));
        }
        let tokens = self.ensure_ready().await?;
        let balance = self.token_balance().await?;
        if balance < amount {
            return Err(ClientError::PreconditionFailed(format!(
                "transfer of {amount} exceeds balance {balance}"
            )));
        }
        let open = self.builder.open_recipient_account()?;
        let ix = self.builder.sweep_to_recipient(&tokens, amount)?;
        self.orchestrator
            .submit("transfer_tokens", &self.builder.with_compute_budget([open, ix]))
            .await
    }

    pub async fn transfer_sol(&self, to: &Pubkey, lamports: u64) -> Result<TxOutcome, ClientError> {
        let _guard = self.lock.acquire().await;
        if lamports == 0 {
            return Err(ClientError::PreconditionFailed("amount must be > 0".into()));
        }
        self.ensure_ready().await?;
        let ix = self.builder.transfer_sol(to, lamports)?;
        self.orchestrator
            .submit("transfer_sol", &self.builder.with_compute_budget([ix]))
            .await
    }
}

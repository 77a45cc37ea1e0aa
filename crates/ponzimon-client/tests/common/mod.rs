//! In-memory ledger for integration tests.
//!
//! Records every submitted transaction and an event log of when each one
//! starts (blockhash fetch) and finalizes, so tests can check ordering.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ponzimon_client::addresses::player_address;
use ponzimon_client::codec::{encode_global_state, encode_player_data};
use ponzimon_client::state::{rarity, Card, Farm, GlobalStateRecord, PlayerRecord, MAX_CARDS};
use ponzimon_client::{
    AccountData, Commitment, LedgerClient, LedgerError, RejectReason, SignatureStatus,
    SimulationResult, TxSettings, WalletConfig, WalletHandle,
};
use sol_wire::{get_associated_token_address, Keypair, Message, Pubkey, SignedTransaction};

pub const PROGRAM_ID: &str = "pv5gAmRb1GZ92k7iuLe5JdNmj5R8Ch61N4beuf2yEdK";
pub const TOKEN_MINT: &str = "mmMeBvEs7dmLXPJZmVQGrV3rTujsAJQHrbJVHQApgJz";

/// Seed `[7; 32]`.
pub const WALLET_SECRET: &str =
    "99eUso3aSbE9tqGSTXzo3TLfKb9RkMTURrHKQ1K7Zh3StnzFNUx8FKCPPPPpR479qsw5zv2WNBKmgiz7WqgAJfM";

pub fn key_from_seed(seed: u8) -> Pubkey {
    Keypair::from_seed(&[seed; 32]).pubkey()
}

/// The handle's own wallet, from `WALLET_SECRET`.
pub fn wallet() -> Pubkey {
    key_from_seed(7)
}

pub fn player_pda() -> Pubkey {
    player_address(&program_id(), &wallet(), &token_mint()).unwrap()
}

pub fn fees_wallet() -> Pubkey {
    key_from_seed(21)
}

pub fn recipient_wallet() -> Pubkey {
    key_from_seed(22)
}

pub fn referrer_wallet() -> Pubkey {
    key_from_seed(23)
}

pub fn program_id() -> Pubkey {
    PROGRAM_ID.parse().unwrap()
}

pub fn token_mint() -> Pubkey {
    TOKEN_MINT.parse().unwrap()
}

pub fn ata(wallet: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, &token_mint()).unwrap()
}

/// Fast, deterministic settings. Tests run with a paused clock anyway.
pub fn test_settings() -> TxSettings {
    TxSettings {
        confirm_initial_delay_ms: 10,
        confirm_poll_interval_ms: 10,
        confirm_max_polls: 5,
        commit_settle_delay_ms: 50,
        inter_step_delay_ms: 20,
        send_retry_backoff_ms: 10,
        fetch_timeout_ms: 1_000,
        ..TxSettings::default()
    }
}

pub fn test_config() -> WalletConfig {
    WalletConfig {
        rpc_url: "http://127.0.0.1:8899".into(),
        program_id: PROGRAM_ID.into(),
        token_mint: TOKEN_MINT.into(),
        fees_wallet: fees_wallet().to_string(),
        recipient_account: recipient_wallet().to_string(),
        referrer_wallet: referrer_wallet().to_string(),
        tx: test_settings(),
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────

pub fn card(id: u16, rarity: u8) -> Card {
    Card {
        id,
        rarity,
        hashpower: 25,
        berry_consumption: 2,
    }
}

/// A player holding `cards` in slots `0..cards.len()`.
pub fn player_with(owner: Pubkey, cards: &[Card]) -> PlayerRecord {
    let mut slots = vec![Card::default(); MAX_CARDS];
    slots[..cards.len()].copy_from_slice(cards);
    PlayerRecord {
        owner,
        farm: Farm {
            farm_type: 1,
            total_cards: 8,
            berry_capacity: 100,
        },
        cards: slots,
        card_count: cards.len() as u8,
        total_hashpower: 50,
        last_acc_tokens_per_hashpower: 400,
        last_claim_slot: 100,
        ..PlayerRecord::default()
    }
}

pub fn starter_player(owner: Pubkey) -> PlayerRecord {
    player_with(
        owner,
        &[card(1, rarity::COMMON), card(2, rarity::COMMON), card(3, rarity::UNCOMMON)],
    )
}

pub fn global_state() -> GlobalStateRecord {
    GlobalStateRecord {
        token_mint: token_mint(),
        fees_wallet: fees_wallet(),
        total_supply: 1_000_000,
        acc_tokens_per_hashpower: 1_000,
        production_enabled: true,
        dust_threshold_divisor: 10,
        booster_pack_cost_microtokens: 100,
        ..GlobalStateRecord::default()
    }
}

pub fn account(data: Vec<u8>) -> AccountData {
    AccountData {
        owner: program_id(),
        lamports: 1_000_000,
        data,
    }
}

// ─── Handles ────────────────────────────────────────────────────────

pub type TestHandle = WalletHandle<Arc<MockLedger>>;

pub fn handle_for(ledger: &Arc<MockLedger>) -> TestHandle {
    WalletHandle::new(WALLET_SECRET, &test_config(), ledger.clone()).unwrap()
}

/// A handle whose game account exists and holds the starter cards.
pub fn initialized(ledger: &Arc<MockLedger>) -> TestHandle {
    let handle = handle_for(ledger);
    let addrs = *handle.program_addresses();
    ledger.put_global_state(addrs.global_state, &global_state());
    ledger.put_player(addrs.player, &starter_player(handle.public_key()));
    handle
}

// ─── Mock ledger ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Finalized on the n-th status poll of a signature (1-based).
    FinalizeAfter(u32),
    /// Seen but never finalized.
    Never,
    /// Landed with a custom program error.
    ExecutionError(u32),
}

/// One transaction accepted by `send_transaction`.
#[derive(Debug, Clone)]
pub struct SentTx {
    pub signature: String,
    pub message: Message,
    /// Data of the last instruction: the game or token instruction.
    pub data: Vec<u8>,
}

impl SentTx {
    pub fn discriminator(&self) -> Option<[u8; 8]> {
        self.data.get(..8).and_then(|d| d.try_into().ok())
    }
}

pub struct MockState {
    pub accounts: HashMap<Pubkey, AccountData>,
    pub token_balances: HashMap<Pubkey, u64>,
    pub lamports: u64,
    pub slot: u64,
    pub sent: Vec<SentTx>,
    pub events: Vec<&'static str>,
    pub status_mode: StatusMode,
    pub polls: HashMap<String, u32>,
    pub send_failures: VecDeque<LedgerError>,
    pub simulate_errors: HashMap<[u8; 8], RejectReason>,
    pub slow_reads: bool,
    blockhash_counter: u8,
}

type SendHook = Box<dyn Fn(&[u8], &mut MockState) + Send + Sync>;

pub struct MockLedger {
    state: Mutex<MockState>,
    on_send: Option<SendHook>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                accounts: HashMap::new(),
                token_balances: HashMap::new(),
                lamports: 0,
                slot: 200,
                sent: Vec::new(),
                events: Vec::new(),
                status_mode: StatusMode::FinalizeAfter(1),
                polls: HashMap::new(),
                send_failures: VecDeque::new(),
                simulate_errors: HashMap::new(),
                slow_reads: false,
                blockhash_counter: 0,
            }),
            on_send: None,
        }
    }

    /// Run `hook` with the last instruction's data after each accepted send.
    pub fn on_send(mut self, hook: impl Fn(&[u8], &mut MockState) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Box::new(hook));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn put_player(&self, address: Pubkey, player: &PlayerRecord) {
        self.with_state(|s| s.accounts.insert(address, account(encode_player_data(player))));
    }

    pub fn put_global_state(&self, address: Pubkey, global: &GlobalStateRecord) {
        self.with_state(|s| s.accounts.insert(address, account(encode_global_state(global))));
    }

    /// Create a token account holding `amount`.
    pub fn put_token_account(&self, address: Pubkey, amount: u64) {
        self.with_state(|s| {
            s.token_balances.insert(address, amount);
            s.accounts.insert(
                address,
                AccountData {
                    owner: sol_wire::ids::TOKEN_PROGRAM_ID,
                    lamports: 2_039_280,
                    data: vec![0; 165],
                },
            );
        });
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.with_state(|s| s.sent.clone())
    }

    pub fn sent_discriminators(&self) -> Vec<Option<[u8; 8]>> {
        self.with_state(|s| s.sent.iter().map(SentTx::discriminator).collect())
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.with_state(|s| s.events.clone())
    }

    fn last_instruction_data(wire: &[u8]) -> Result<(String, Message, Vec<u8>), LedgerError> {
        let tx = SignedTransaction::from_wire(wire).map_err(|e| LedgerError::Transport(e.to_string()))?;
        let data = tx
            .message
            .instructions
            .last()
            .map(|ix| ix.data.clone())
            .unwrap_or_default();
        Ok((tx.signature(), tx.message, data))
    }
}

impl LedgerClient for MockLedger {
    async fn latest_blockhash(&self) -> Result<[u8; 32], LedgerError> {
        self.with_state(|s| {
            s.events.push("begin");
            s.blockhash_counter = s.blockhash_counter.wrapping_add(1);
            Ok([s.blockhash_counter; 32])
        })
    }

    async fn simulate_transaction(&self, wire: &[u8]) -> Result<SimulationResult, LedgerError> {
        let (_, _, data) = Self::last_instruction_data(wire)?;
        let err = data
            .get(..8)
            .and_then(|d| <[u8; 8]>::try_from(d).ok())
            .and_then(|d| self.with_state(|s| s.simulate_errors.get(&d).cloned()));
        Ok(SimulationResult {
            logs: vec!["Program log: simulated".into()],
            units_consumed: Some(12_345),
            err,
        })
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, LedgerError> {
        if let Some(failure) = self.with_state(|s| s.send_failures.pop_front()) {
            return Err(failure);
        }
        let (signature, message, data) = Self::last_instruction_data(wire)?;
        let mut state = self.state.lock().unwrap();
        state.sent.push(SentTx {
            signature: signature.clone(),
            message,
            data: data.clone(),
        });
        if let Some(hook) = &self.on_send {
            hook(&data, &mut state);
        }
        Ok(signature)
    }

    async fn signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>, LedgerError> {
        self.with_state(|s| {
            let polls = s.polls.entry(signature.to_string()).or_insert(0);
            *polls += 1;
            let status = match s.status_mode {
                StatusMode::FinalizeAfter(n) if *polls >= n => {
                    s.events.push("end");
                    SignatureStatus {
                        confirmation: Some(Commitment::Finalized),
                        err: None,
                    }
                }
                StatusMode::FinalizeAfter(_) | StatusMode::Never => SignatureStatus {
                    confirmation: Some(Commitment::Confirmed),
                    err: None,
                },
                StatusMode::ExecutionError(code) => SignatureStatus {
                    confirmation: Some(Commitment::Processed),
                    err: Some(RejectReason::code(code)),
                },
            };
            Ok(Some(status))
        })
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<AccountData>, LedgerError> {
        if self.with_state(|s| s.slow_reads) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Ok(self.with_state(|s| s.accounts.get(address).cloned()))
    }

    async fn slot(&self) -> Result<u64, LedgerError> {
        Ok(self.with_state(|s| s.slot))
    }

    async fn token_account_balance(&self, address: &Pubkey) -> Result<Option<u64>, LedgerError> {
        Ok(self.with_state(|s| s.token_balances.get(address).copied()))
    }

    async fn balance(&self, _address: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self.with_state(|s| s.lamports))
    }
}

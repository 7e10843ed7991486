use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Direction of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Credit,
    Debit,
}

/// One randomized transfer against the ledger. Ephemeral, generated per
/// operation and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub kind: Kind,
    pub amount: i64,
}

impl Transaction {
    pub const fn credit(amount: i64) -> Self {
        Self {
            kind: Kind::Credit,
            amount,
        }
    }

    pub const fn debit(amount: i64) -> Self {
        Self {
            kind: Kind::Debit,
            amount,
        }
    }

    /// Coin-flip direction, amount in `[0, 100)`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let amount = rng.gen_range(0..100);
        if rng.r#gen() {
            Self::credit(amount)
        } else {
            Self::debit(amount)
        }
    }
}

/// A worker's stream of transactions.
pub trait TxSource {
    fn next_tx(&mut self) -> Transaction;
}

/// Random stream backed by a per-worker `SmallRng`, seeded once at
/// construction. Workers never share or reseed their generator, so the
/// streams stay decorrelated regardless of clock resolution.
pub struct RngSource {
    rng: SmallRng,
}

impl RngSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TxSource for RngSource {
    fn next_tx(&mut self) -> Transaction {
        Transaction::random(&mut self.rng)
    }
}

/// Fixed, replayable stream. Cycles through the script so a worker can run
/// any transaction count against a short sequence.
pub struct ScriptSource {
    script: Vec<Transaction>,
    next: usize,
}

impl ScriptSource {
    pub fn new(script: Vec<Transaction>) -> Self {
        assert!(!script.is_empty(), "script must not be empty");
        Self { script, next: 0 }
    }
}

impl TxSource for ScriptSource {
    fn next_tx(&mut self) -> Transaction {
        let tx = self.script[self.next];
        self.next = (self.next + 1) % self.script.len();
        tx
    }
}

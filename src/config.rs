//! Descriptors for assembling a simulation at startup.
//!
//! Every descriptor fully fixes the parameters of the component it builds,
//! so a roster of descriptors pins down a reproducible experiment.

use crate::predictor::*;

/// A fully parameterized direction predictor description.
#[derive(Clone, Debug)]
pub enum DirectionConfig {
    AlwaysTaken,
    Btfnt,
    Nbit {
        index_bits: usize,
        cntr_bits: usize,
        fsm: u8,
    },
    GlobalHistory {
        entry_bits: usize,
        nbit: usize,
    },
    LocalHistory {
        bht_entry_bits: usize,
        bht_len: usize,
        pht_entry_bits: usize,
        pht_cntr_bits: usize,
    },
    Alpha21264,
    Tournament {
        meta_entry_bits: usize,
        pred0: Box<DirectionConfig>,
        pred1: Box<DirectionConfig>,
    },
}

impl DirectionConfig {
    /// A local-history predictor with the default 8K-entry 2-bit PHT.
    pub fn local_history(bht_entry_bits: usize, bht_len: usize) -> Self {
        Self::LocalHistory {
            bht_entry_bits,
            bht_len,
            pht_entry_bits: 13,
            pht_cntr_bits: 2,
        }
    }

    pub fn build(&self) -> Box<dyn DirectionPredictor> {
        match self {
            Self::AlwaysTaken => Box::new(AlwaysTakenPredictor::new()),
            Self::Btfnt => Box::new(BtfntPredictor::new()),
            Self::Nbit { index_bits, cntr_bits, fsm } => {
                Box::new(NbitPredictor::with_fsm(*index_bits, *cntr_bits, *fsm))
            }
            Self::GlobalHistory { entry_bits, nbit } => {
                Box::new(GlobalHistoryPredictor::new(*entry_bits, *nbit))
            }
            Self::LocalHistory {
                bht_entry_bits,
                bht_len,
                pht_entry_bits,
                pht_cntr_bits,
            } => Box::new(LocalHistoryPredictor::with_pht(
                *bht_entry_bits,
                *bht_len,
                *pht_entry_bits,
                *pht_cntr_bits,
            )),
            Self::Alpha21264 => Box::new(Alpha21264Predictor::new()),
            Self::Tournament { meta_entry_bits, pred0, pred1 } => Box::new(
                TournamentPredictor::new(*meta_entry_bits, pred0.build(), pred1.build()),
            ),
        }
    }
}

/// Branch target buffer geometry.
#[derive(Clone, Copy, Debug)]
pub struct BtbConfig {
    pub lines: usize,
    pub assoc: usize,
}
impl BtbConfig {
    pub fn build(&self) -> BtbPredictor {
        BtbPredictor::new(self.lines, self.assoc)
    }
}

/// Return-address stack capacity.
#[derive(Clone, Copy, Debug)]
pub struct RasConfig {
    pub entries: usize,
}
impl RasConfig {
    pub fn build(&self) -> ReturnAddressStack {
        ReturnAddressStack::new(self.entries)
    }
}

/// The direction predictor roster evaluated by the branch driver.
pub fn reference_predictors() -> Vec<DirectionConfig> {
    use DirectionConfig::*;
    vec![
        AlwaysTaken,
        Btfnt,
        Nbit { index_bits: 13, cntr_bits: 4, fsm: 1 },
        DirectionConfig::local_history(11, 8),
        DirectionConfig::local_history(12, 4),
        DirectionConfig::local_history(13, 2),
        GlobalHistory { entry_bits: 14, nbit: 2 },
        GlobalHistory { entry_bits: 13, nbit: 4 },
        Alpha21264,
        Tournament {
            meta_entry_bits: 10,
            pred0: Box::new(Nbit { index_bits: 13, cntr_bits: 2, fsm: 1 }),
            pred1: Box::new(Nbit { index_bits: 12, cntr_bits: 4, fsm: 1 }),
        },
        Tournament {
            meta_entry_bits: 11,
            pred0: Box::new(Nbit { index_bits: 13, cntr_bits: 2, fsm: 1 }),
            pred1: Box::new(GlobalHistory { entry_bits: 13, nbit: 2 }),
        },
        Tournament {
            meta_entry_bits: 11,
            pred0: Box::new(Nbit { index_bits: 13, cntr_bits: 2, fsm: 1 }),
            pred1: Box::new(LocalHistory {
                bht_entry_bits: 12,
                bht_len: 2,
                pht_entry_bits: 12,
                pht_cntr_bits: 2,
            }),
        },
        Tournament {
            meta_entry_bits: 11,
            pred0: Box::new(LocalHistory {
                bht_entry_bits: 12,
                bht_len: 2,
                pht_entry_bits: 12,
                pht_cntr_bits: 2,
            }),
            pred1: Box::new(GlobalHistory { entry_bits: 13, nbit: 2 }),
        },
        Tournament {
            meta_entry_bits: 11,
            pred0: Box::new(GlobalHistory { entry_bits: 13, nbit: 2 }),
            pred1: Box::new(GlobalHistory { entry_bits: 12, nbit: 4 }),
        },
        Tournament {
            meta_entry_bits: 11,
            pred0: Box::new(LocalHistory {
                bht_entry_bits: 12,
                bht_len: 2,
                pht_entry_bits: 12,
                pht_cntr_bits: 2,
            }),
            pred1: Box::new(LocalHistory {
                bht_entry_bits: 11,
                bht_len: 4,
                pht_entry_bits: 12,
                pht_cntr_bits: 2,
            }),
        },
    ]
}

/// The BTB geometries evaluated by the branch driver.
pub fn reference_btbs() -> Vec<BtbConfig> {
    vec![
        BtbConfig { lines: 512, assoc: 1 },
        BtbConfig { lines: 512, assoc: 2 },
        BtbConfig { lines: 256, assoc: 2 },
        BtbConfig { lines: 256, assoc: 4 },
        BtbConfig { lines: 128, assoc: 2 },
        BtbConfig { lines: 128, assoc: 4 },
        BtbConfig { lines: 64, assoc: 4 },
        BtbConfig { lines: 64, assoc: 8 },
    ]
}

/// The return-address stack sizes evaluated by the branch driver.
pub fn reference_stacks() -> Vec<RasConfig> {
    vec![
        RasConfig { entries: 4 },
        RasConfig { entries: 8 },
        RasConfig { entries: 16 },
        RasConfig { entries: 32 },
        RasConfig { entries: 48 },
        RasConfig { entries: 64 },
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn descriptors_build_named_predictors() {
        let names: Vec<String> = reference_predictors()
            .iter()
            .map(|cfg| cfg.build().name())
            .collect();
        assert_eq!(names[0], "Static AlwaysTaken");
        assert_eq!(names[1], "Static BTFNT");
        assert_eq!(names[2], "Nbit-8K-4");
        assert_eq!(names[3], "LocalHistory(bht-entries=2048, bht-len=8)");
        assert_eq!(names[6], "GlobalHistory(entries=16384, nbit=2)");
        assert_eq!(names[8], "Alpha21264");
        assert!(names[9].starts_with("Tournament(meta=1024, Nbit-8K-2"));
    }

    #[test]
    fn roster_sizes_match_the_reference_runs() {
        assert_eq!(reference_predictors().len(), 15);
        assert_eq!(reference_btbs().len(), 8);
        assert_eq!(reference_stacks().len(), 6);
    }
}

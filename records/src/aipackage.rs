//! Actor AI settings shared by creatures and NPCs.

use esm::{decode_padding, encode_padding, Composite};

/// Services an actor offers, as bits of [`AIData::services`].
pub mod services {
    pub const WEAPON: i32 = 0x00001;
    pub const ARMOR: i32 = 0x00002;
    pub const CLOTHING: i32 = 0x00004;
    pub const BOOKS: i32 = 0x00008;
    pub const INGREDIENTS: i32 = 0x00010;
    pub const PICKS: i32 = 0x00020;
    pub const PROBES: i32 = 0x00040;
    pub const LIGHTS: i32 = 0x00080;
    pub const APPARATUS: i32 = 0x00100;
    pub const REPAIR_ITEM: i32 = 0x00200;
    pub const MISC: i32 = 0x00400;
    pub const SPELLS: i32 = 0x00800;
    pub const MAGIC_ITEMS: i32 = 0x01000;
    pub const POTIONS: i32 = 0x02000;
    pub const TRAINING: i32 = 0x04000;
    pub const SPELLMAKING: i32 = 0x08000;
    pub const ENCHANTING: i32 = 0x10000;
    pub const REPAIR: i32 = 0x20000;
}

/// AI disposition values (`AIDT` payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AIData {
    /// Greeting distance.
    pub hello: u16,
    /// Probabilities in percent.
    pub fight: u8,
    pub flee: u8,
    pub alarm: u8,
    pub services: i32,
}

impl AIData {
    pub fn blank(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn offers(&self, service: i32) -> bool {
        self.services & service != 0
    }
}

impl Composite for AIData {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut Vec<u8>) {
        self.hello.encode(out);
        self.fight.encode(out);
        self.flee.encode(out);
        self.alarm.encode(out);
        encode_padding(out, 3);
        self.services.encode(out);
    }

    fn decode(input: &mut &[u8]) -> Self {
        let hello = u16::decode(input);
        let fight = u8::decode(input);
        let flee = u8::decode(input);
        let alarm = u8::decode(input);
        decode_padding(input, 3);
        Self {
            hello,
            fight,
            flee,
            alarm,
            services: i32::decode(input),
        }
    }
}

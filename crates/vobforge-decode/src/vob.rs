//! Scene object (VOB) records

use num_enum::{IntoPrimitive, TryFromPrimitive};
use vobforge_core::{ForgeError, Result};

/// Closed set of scene object type tags, in native tag order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum VobKind {
    Vob = 0,
    VobLevelCompo,
    Item,
    Mob,
    MobInter,
    MobDoor,
    MobBed,
    MobFire,
    MobLadder,
    MobSwitch,
    MobWheel,
    MobContainer,
    VobLight,
    VobSound,
    VobSoundDaytime,
    ZoneMusic,
    ZoneMusicDefault,
    MessageFilter,
    CodeMaster,
    Trigger,
    TriggerList,
    TriggerScript,
    TriggerChangeLevel,
    TriggerWorldStart,
    Mover,
    VobStartpoint,
    VobSpot,
    PfxController,
    TouchDamage,
}

impl VobKind {
    pub fn from_tag(tag: u32) -> Result<Self> {
        Self::try_from(tag)
            .map_err(|e| ForgeError::DecodeError(format!("Unknown scene object type: {}", e.number)))
    }

    /// Kinds that receive interaction metadata when imported
    pub fn is_interactable(&self) -> bool {
        matches!(self, VobKind::MobInter | VobKind::MobDoor | VobKind::MobContainer)
    }

    pub fn is_lockable(&self) -> bool {
        matches!(self, VobKind::MobDoor | VobKind::MobContainer)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockRecord {
    pub locked: bool,
    pub key: String,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRecord {
    /// Packed `0xAARRGGBB`
    pub color: u32,
    /// Source units
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VobRecord {
    pub kind: VobKind,
    pub name: String,
    pub visual: String,
    /// World position, source units
    pub position: [f32; 3],
    /// World rotation as matrix rows
    pub rotation: [[f32; 3]; 3],
    pub lock: Option<LockRecord>,
    pub contents: String,
    pub light: Option<LightRecord>,
    pub children: Vec<VobRecord>,
}

impl VobRecord {
    pub const IDENTITY_ROTATION: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    pub fn new(kind: VobKind, name: impl Into<String>, visual: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            visual: visual.into(),
            position: [0.0; 3],
            rotation: Self::IDENTITY_ROTATION,
            lock: None,
            contents: String::new(),
            light: None,
            children: Vec::new(),
        }
    }

    pub fn at(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_child(mut self, child: VobRecord) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_locked(&self) -> bool {
        self.lock.as_ref().is_some_and(|l| l.locked)
    }
}

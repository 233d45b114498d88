//! Integration tests driving the patch engine through a simulated host.
//!
//! `SimulatedHost` plays the role of a runtime bridge: it resolves operations, keeps the
//! installed hooks per owner, rewrites operation bodies when a rewrite hook is installed and
//! dispatches hooked calls to the shared interceptors, falling back to its own "original"
//! behavior whenever a prefix asks for it.

use std::{collections::HashMap, sync::Arc};

use cilpatch::{
    patch::catalog::{
        FIND_PLAYER, IS_COLLIDING_POSITION, IS_TEMP, STARTS_WITH, STARTS_WITH_COMPARISON,
    },
    prelude::*,
};

const STARTS_WITH_TOKEN: Token = Token::member_ref(0x40);
const ORDINAL_STARTS_WITH_TOKEN: Token = Token::member_ref(0x41);

struct Creature {
    traits: EntityTraits,
}

impl Classify for Creature {
    fn traits(&self) -> Result<EntityTraits> {
        Ok(self.traits)
    }
}

struct Farm {
    players: Vec<&'static str>,
}

impl Session for Farm {
    type Actor = &'static str;

    fn is_multiplayer(&self) -> Result<bool> {
        Ok(self.players.len() > 1)
    }

    fn local_actor(&self) -> Result<Self::Actor> {
        self.players
            .first()
            .copied()
            .ok_or_else(|| Error::Error("no local player".into()))
    }
}

struct SimulatedHost {
    operations: HashMap<TargetOperation, Token>,
    bodies: HashMap<Token, InstructionSequence>,
    originals: HashMap<Token, InstructionSequence>,
    hooks: HashMap<(Token, PatchKind), String>,
    interceptors: Arc<Interceptors>,
    original_calls: usize,
}

impl SimulatedHost {
    fn new(interceptors: Arc<Interceptors>) -> Self {
        let operations = HashMap::from([
            (IS_COLLIDING_POSITION, Token::method_def(0x10)),
            (IS_TEMP, Token::method_def(0x11)),
            (FIND_PLAYER, Token::method_def(0x20)),
            (STARTS_WITH, STARTS_WITH_TOKEN),
            (STARTS_WITH_COMPARISON, ORDINAL_STARTS_WITH_TOKEN),
        ]);

        // isTemp(): Name.StartsWith("Temp") || Name.StartsWith("UndergroundMine")
        let is_temp = SequenceBuilder::new()
            .ldarg(0)
            .ldstr(Token::new(0x7000_0010))
            .callvirt(STARTS_WITH_TOKEN)
            .ldarg(0)
            .ldstr(Token::new(0x7000_0020))
            .callvirt(STARTS_WITH_TOKEN)
            .ret()
            .build();

        SimulatedHost {
            operations,
            bodies: HashMap::from([(Token::method_def(0x11), is_temp)]),
            originals: HashMap::new(),
            hooks: HashMap::new(),
            interceptors,
            original_calls: 0,
        }
    }

    fn token_of(&self, target: &TargetOperation) -> Token {
        self.operations[target]
    }

    fn is_hooked(&self, target: &TargetOperation, kind: PatchKind) -> bool {
        self.hooks.contains_key(&(self.token_of(target), kind))
    }

    fn body(&self, target: &TargetOperation) -> &InstructionSequence {
        &self.bodies[&self.token_of(target)]
    }

    /// The host's collision check: solid everywhere in this simulation.
    fn is_colliding_position(&mut self, glider: bool, character: &Creature) -> bool {
        if self.is_hooked(&IS_COLLIDING_POSITION, PatchKind::Prefix) {
            let mut result = true;
            if !self
                .interceptors
                .collision(glider, character, &mut result)
                .run_original()
            {
                return result;
            }
        }
        self.original_calls += 1;
        true
    }

    /// The host's player search: scans every participant and picks the last one.
    fn find_player(&mut self, farm: &Farm) -> Option<&'static str> {
        if self.is_hooked(&FIND_PLAYER, PatchKind::Prefix) {
            let mut result = None;
            if !self
                .interceptors
                .local_actor(farm, &mut result)
                .run_original()
            {
                return result;
            }
        }
        self.original_calls += 1;
        farm.players.last().copied()
    }
}

impl HostIntrospection for SimulatedHost {
    fn resolve(&self, target: &TargetOperation) -> Option<OperationHandle> {
        self.operations.get(target).copied().map(OperationHandle)
    }
}

impl HookRegistry for SimulatedHost {
    fn install(
        &mut self,
        handle: OperationHandle,
        patch: &PatchDescriptor,
        owner: &str,
    ) -> Result<()> {
        let key = (handle.token(), patch.kind());
        if self.hooks.contains_key(&key) {
            return Err(Error::Error(format!("{} already hooked", patch.target)));
        }

        if patch.kind() == PatchKind::Rewrite {
            let original = self
                .bodies
                .get(&handle.token())
                .cloned()
                .ok_or_else(|| Error::Error(format!("{} has no body", patch.target)))?;
            let rewritten = self.interceptors.ordinal_starts_with(&*self, &original);
            self.originals.insert(handle.token(), original);
            self.bodies.insert(handle.token(), rewritten);
        }

        self.hooks.insert(key, owner.to_string());
        Ok(())
    }

    fn uninstall(&mut self, handle: OperationHandle, kind: PatchKind, owner: &str) -> Result<()> {
        match self.hooks.get(&(handle.token(), kind)) {
            Some(existing) if existing == owner => {}
            _ => return Err(Error::Error(format!("no {kind} hook owned by {owner}"))),
        }

        self.hooks.remove(&(handle.token(), kind));
        if kind == PatchKind::Rewrite {
            if let Some(original) = self.originals.remove(&handle.token()) {
                self.bodies.insert(handle.token(), original);
            }
        }
        Ok(())
    }
}

fn controller(config: PatchConfig) -> Result<PatchController<SimulatedHost>> {
    let interceptors = Arc::new(Interceptors::new(&config));
    let host = SimulatedHost::new(Arc::clone(&interceptors));
    PatchController::with_interceptors(host, config, interceptors)
}

fn bat() -> Creature {
    Creature {
        traits: EntityTraits::HOSTILE | EntityTraits::FLYING,
    }
}

#[test]
fn test_full_lifecycle() -> Result<()> {
    let mut controller = controller(PatchConfig::default())?;
    controller.apply_all()?;
    assert_eq!(controller.applied().len(), 3);

    let host = controller.host();
    assert_eq!(host.hooks.len(), 3);
    assert!(host.hooks.values().all(|owner| owner == "cilpatch"));

    controller.remove_all()?;
    assert!(!controller.is_applied());
    assert!(controller.host().hooks.is_empty());
    Ok(())
}

#[test]
fn test_apply_twice_installs_once() -> Result<()> {
    let mut controller = controller(PatchConfig::default())?;
    controller.apply_all()?;
    // A second install on the same operation would be rejected by the host
    controller.apply_all()?;
    assert_eq!(controller.host().hooks.len(), 3);

    controller.remove_all()?;
    controller.remove_all()?;
    assert!(controller.host().hooks.is_empty());
    Ok(())
}

#[test]
fn test_collision_short_circuit_in_host() -> Result<()> {
    let mut controller = controller(PatchConfig::default())?;
    controller.apply_all()?;

    let mut host = controller.into_host();
    assert!(!host.is_colliding_position(true, &bat()));
    assert_eq!(host.original_calls, 0);

    // The flight flag is the caller's glider argument, not the creature's own traits
    let slime = Creature {
        traits: EntityTraits::HOSTILE,
    };
    assert!(!host.is_colliding_position(true, &slime));
    assert_eq!(host.original_calls, 0);

    assert!(host.is_colliding_position(false, &bat()));
    assert_eq!(host.original_calls, 1);

    let chicken = Creature {
        traits: EntityTraits::FLYING,
    };
    assert!(host.is_colliding_position(true, &chicken));
    assert_eq!(host.original_calls, 2);
    Ok(())
}

#[test]
fn test_find_player_single_and_multi() -> Result<()> {
    let mut controller = controller(PatchConfig::default())?;
    controller.apply_all()?;
    let mut host = controller.into_host();

    let solo = Farm {
        players: vec!["farmer"],
    };
    assert_eq!(host.find_player(&solo), Some("farmer"));
    assert_eq!(host.original_calls, 0);

    let coop = Farm {
        players: vec!["host", "farmhand"],
    };
    assert_eq!(host.find_player(&coop), Some("farmhand"));
    assert_eq!(host.original_calls, 1);
    Ok(())
}

#[test]
fn test_find_player_fault_falls_back() -> Result<()> {
    let mut controller = controller(PatchConfig::default())?;
    controller.apply_all()?;
    let interceptors = Arc::clone(controller.interceptors());
    let mut host = controller.into_host();

    let empty = Farm { players: vec![] };
    assert_eq!(host.find_player(&empty), None);
    assert_eq!(host.find_player(&empty), None);
    assert_eq!(host.original_calls, 2);

    assert_eq!(interceptors.faults().len(), 1);
    assert!(interceptors.faults().has_faulted("local_actor_shortcut"));
    Ok(())
}

#[test]
fn test_is_temp_rewritten_and_restored() -> Result<()> {
    let mut controller = controller(PatchConfig::default())?;
    let original = controller.host().body(&IS_TEMP).clone();
    controller.apply_all()?;

    let rewritten = controller.host().body(&IS_TEMP).clone();
    assert_eq!(rewritten.len(), original.len() + 2);
    assert_eq!(rewritten.call_sites(STARTS_WITH_TOKEN).count(), 0);
    assert_eq!(
        rewritten
            .call_sites(ORDINAL_STARTS_WITH_TOKEN)
            .collect::<Vec<_>>(),
        vec![3, 7]
    );
    assert_eq!(rewritten[2].ldc_i4_value(), Some(4));
    assert_eq!(rewritten[6].ldc_i4_value(), Some(4));
    assert!(controller.interceptors().faults().is_empty());

    controller.remove_all()?;
    assert_eq!(controller.host().body(&IS_TEMP), &original);
    Ok(())
}

#[test]
fn test_partial_config() -> Result<()> {
    let config = PatchConfig::default()
        .with_owner_id("perf")
        .with_ordinal_rewrite(false);
    let mut controller = controller(config)?;
    controller.apply_all()?;

    let host = controller.host();
    assert_eq!(host.hooks.len(), 2);
    assert!(!host.is_hooked(&IS_TEMP, PatchKind::Rewrite));
    assert!(host.hooks.values().all(|owner| owner == "perf"));
    Ok(())
}

#[test]
fn test_incompatible_host_rejected() -> Result<()> {
    let config = PatchConfig::default();
    let interceptors = Arc::new(Interceptors::new(&config));
    let mut host = SimulatedHost::new(Arc::clone(&interceptors));
    host.operations.remove(&FIND_PLAYER);

    let mut controller = PatchController::with_interceptors(host, config, interceptors)?;
    match controller.apply_all() {
        Err(Error::TargetNotFound(target)) => assert_eq!(target, FIND_PLAYER),
        other => panic!("expected TargetNotFound, got {other:?}"),
    }
    assert!(!controller.is_applied());
    assert!(controller.host().hooks.is_empty());
    Ok(())
}

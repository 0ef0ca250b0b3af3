use std::{
    collections::{hash_map::DefaultHasher, BTreeMap},
    hash::{Hash, Hasher},
    time::Duration,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use waypoint_defence_core::{
    Command, EnemyKind, Event, InvalidPlacement, RunStatus, SpawnEntry, TileCoord, TowerKind,
    Wave, WorldPoint,
};
use waypoint_defence_world::{
    apply, query, Campaign, Catalogue, EnemyStats, GameState, LevelDefinition, LevelModel, Rules,
    TileKind, TowerStats,
};

const SECOND: Duration = Duration::from_secs(1);

/// Two-row level: the top row is the path, the bottom row is buildable.
fn corridor(columns: u32, tile_size: f32) -> LevelModel {
    let mut tiles = vec![TileKind::Path; columns as usize];
    tiles.extend(vec![TileKind::Buildable; columns as usize]);
    let y = tile_size / 2.0;
    LevelModel::new(
        columns,
        2,
        tile_size,
        tiles,
        vec![
            WorldPoint::new(0.0, y),
            WorldPoint::new(columns as f32 * tile_size, y),
        ],
    )
    .expect("valid corridor")
}

fn enemy(max_health: u32, speed: f32, bounty: u32, penalty: u32) -> EnemyStats {
    EnemyStats {
        max_health,
        speed,
        bounty,
        penalty,
    }
}

fn tower(cost: u32, range: f32, damage: u32, interval: Duration) -> TowerStats {
    TowerStats {
        cost,
        range,
        damage,
        fire_interval: interval,
    }
}

fn catalogue(enemies: &[(EnemyKind, EnemyStats)], tower_stats: TowerStats) -> Catalogue {
    let towers = TowerKind::ALL
        .into_iter()
        .map(|kind| (kind, tower_stats))
        .collect::<BTreeMap<_, _>>();
    Catalogue::new(enemies.iter().copied().collect(), towers).expect("valid catalogue")
}

fn spawns(entries: &[(EnemyKind, u64)]) -> Wave {
    Wave::new(
        entries
            .iter()
            .map(|(kind, offset_ms)| SpawnEntry::new(*kind, Duration::from_millis(*offset_ms)))
            .collect(),
    )
}

fn game(levels: Vec<LevelDefinition>, catalogue: Catalogue, rules: Rules) -> GameState {
    GameState::new(Campaign::new(levels).expect("valid campaign"), catalogue, rules)
        .expect("valid game state")
}

#[test]
fn enemy_walking_the_whole_path_costs_its_penalty_once() {
    let mut state = game(
        vec![LevelDefinition::new(
            corridor(20, 32.0),
            vec![spawns(&[(EnemyKind::Math, 0)])],
        )],
        catalogue(&[(EnemyKind::Math, enemy(10, 64.0, 3, 5))], tower(50, 0.0, 1, SECOND)),
        Rules::default(),
    );
    state.play();

    for _ in 0..9 {
        state.update(SECOND);
    }
    assert_eq!(query::enemy_count(&state), 1);
    assert_eq!(state.lifepoints(), 20);

    state.update(SECOND);
    assert_eq!(query::enemy_count(&state), 0);
    assert_eq!(state.lifepoints(), 15);
    assert_eq!(state.credits(), 100, "arrivals never pay a bounty");

    let arrivals = state
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::EnemyArrived { penalty: 5, .. }))
        .count();
    assert_eq!(arrivals, 1);

    state.update(SECOND);
    assert_eq!(state.lifepoints(), 15);
}

#[test]
fn tower_kills_stationary_enemy_after_three_ticks() {
    let mut state = game(
        vec![LevelDefinition::new(
            corridor(3, 32.0),
            vec![spawns(&[(EnemyKind::Code, 0)])],
        )],
        catalogue(&[(EnemyKind::Code, enemy(25, 0.0, 10, 5))], tower(50, 100.0, 10, SECOND)),
        Rules::default(),
    );
    let _ = state
        .place_tower(TowerKind::Math, TileCoord::new(0, 1))
        .expect("buildable tile");
    assert_eq!(state.credits(), 50);
    state.play();

    state.update(SECOND);
    state.update(SECOND);
    let health = query::enemy_view(&state)
        .iter()
        .next()
        .map(|enemy| enemy.health.get());
    assert_eq!(health, Some(5));

    state.update(SECOND);
    assert_eq!(query::enemy_count(&state), 0);
    assert_eq!(state.credits(), 60);

    let kills: Vec<_> = state
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .collect();
    assert_eq!(kills.len(), 1);
    assert_eq!(state.lifepoints(), 20, "killed enemies never cost lifepoints");
    assert_eq!(state.status(), RunStatus::Won);
}

#[test]
fn unaffordable_placement_changes_nothing() {
    let mut state = game(
        vec![LevelDefinition::new(corridor(3, 32.0), Vec::new())],
        catalogue(&[], tower(50, 100.0, 10, SECOND)),
        Rules {
            starting_credits: 40,
            ..Rules::default()
        },
    );
    let _ = state.drain_events();

    let mut events = Vec::new();
    apply(
        &mut state,
        Command::PlaceTower {
            kind: TowerKind::Economics,
            tile: TileCoord::new(1, 1),
        },
        &mut events,
    );

    let reason = InvalidPlacement::InsufficientCredits {
        cost: 50,
        available: 40,
    };
    assert_eq!(
        events,
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Economics,
            tile: TileCoord::new(1, 1),
            reason,
        }]
    );
    assert_eq!(state.credits(), 40);
    assert_eq!(query::tower_count(&state), 0);
    assert_eq!(
        state.place_tower(TowerKind::Economics, TileCoord::new(1, 1)),
        Err(reason)
    );
}

#[test]
fn status_moves_from_idle_through_running_to_lost_and_back_via_reset() {
    let mut state = game(
        vec![LevelDefinition::new(
            corridor(2, 32.0),
            vec![spawns(&[(EnemyKind::Hardware, 0), (EnemyKind::Hardware, 0)])],
        )],
        catalogue(
            &[(EnemyKind::Hardware, enemy(50, 64.0, 1, 10))],
            tower(10, 0.0, 1, SECOND),
        ),
        Rules::default(),
    );
    let _ = state.drain_events();

    state.play();
    state.update(SECOND);
    assert_eq!(state.lifepoints(), 0);
    assert_eq!(state.status(), RunStatus::Lost);

    state.play();
    assert_eq!(state.status(), RunStatus::Lost, "finished runs only leave via reset");
    assert_eq!(
        state.place_tower(TowerKind::Math, TileCoord::new(0, 1)),
        Err(InvalidPlacement::RunFinished)
    );

    state.reset();
    assert_eq!(state.status(), RunStatus::Idle);
    assert_eq!(state.lifepoints(), 20);

    let transitions: Vec<_> = state
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            Event::StatusChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (RunStatus::Idle, RunStatus::Running),
            (RunStatus::Running, RunStatus::Lost),
            (RunStatus::Lost, RunStatus::Idle),
        ]
    );
}

#[test]
fn level_transition_clears_towers_and_carries_economy() {
    let wave = || vec![spawns(&[(EnemyKind::Social, 0)])];
    let mut state = game(
        vec![
            LevelDefinition::new(corridor(3, 32.0), wave()),
            LevelDefinition::new(corridor(4, 32.0), wave()),
        ],
        catalogue(&[(EnemyKind::Social, enemy(10, 0.0, 25, 5))], tower(30, 100.0, 10, SECOND)),
        Rules::default(),
    );
    let _ = state
        .place_tower(TowerKind::Social, TileCoord::new(0, 1))
        .expect("buildable tile");
    let _ = state.drain_events();
    state.play();

    state.update(SECOND);
    assert_eq!(state.level_number(), 2);
    assert_eq!(query::tower_count(&state), 0);
    assert_eq!(state.credits(), 95);
    assert_eq!(query::level(&state).columns(), 4);
    assert_eq!(state.status(), RunStatus::Running);

    let events = state.drain_events();
    assert!(events.contains(&Event::LevelStarted { level: 2 }));
    assert!(events.contains(&Event::WaveStarted { level: 2, wave: 1 }));
}

#[test]
fn waves_run_in_order_within_a_level() {
    let mut state = game(
        vec![LevelDefinition::new(
            corridor(3, 32.0),
            vec![
                spawns(&[(EnemyKind::Theory, 0)]),
                spawns(&[(EnemyKind::Theory, 0), (EnemyKind::Theory, 500)]),
            ],
        )],
        catalogue(&[(EnemyKind::Theory, enemy(10, 0.0, 1, 1))], tower(10, 100.0, 10, SECOND)),
        Rules::default(),
    );
    let _ = state
        .place_tower(TowerKind::Theory, TileCoord::new(0, 1))
        .expect("buildable tile");
    state.play();

    state.update(SECOND);
    assert_eq!(state.wave_number(), 2);
    assert_eq!(state.status(), RunStatus::Running);

    state.update(SECOND);
    assert_eq!(query::enemy_count(&state), 1, "one tower shot per second");
    state.update(SECOND);
    assert_eq!(state.status(), RunStatus::Won);
}

fn pressure_campaign() -> (Vec<LevelDefinition>, Catalogue) {
    let levels = vec![LevelDefinition::new(
        corridor(10, 40.0),
        vec![
            spawns(&[
                (EnemyKind::Math, 0),
                (EnemyKind::Math, 1_000),
                (EnemyKind::Hardware, 2_000),
            ]),
            spawns(&[
                (EnemyKind::Math, 0),
                (EnemyKind::Hardware, 1_000),
                (EnemyKind::Math, 3_000),
            ]),
        ],
    )];
    let catalogue = catalogue(
        &[
            (EnemyKind::Math, enemy(20, 10.0, 7, 5)),
            (EnemyKind::Hardware, enemy(1_000, 40.0, 50, 5)),
        ],
        tower(20, 10_000.0, 10, SECOND),
    );
    (levels, catalogue)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Outcome {
    status: RunStatus,
    credits: u32,
    lifepoints: u32,
    remaining_enemies: usize,
}

impl Outcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn run_pressure(dt: Duration, fast_forward: bool, ticks: u32) -> Outcome {
    let (levels, catalogue) = pressure_campaign();
    let mut state = game(levels, catalogue, Rules::default());
    for column in [2, 6] {
        let _ = state
            .place_tower(TowerKind::Code, TileCoord::new(column, 1))
            .expect("buildable tile");
    }
    state.play();
    if fast_forward {
        state.fast_forward_on();
    }

    for _ in 0..ticks {
        let delta = state.rules().scale_delta(dt, state.is_fast_forward());
        state.update(delta);
        if state.status().is_terminal() {
            break;
        }
    }

    Outcome {
        status: state.status(),
        credits: state.credits(),
        lifepoints: state.lifepoints(),
        remaining_enemies: query::enemy_count(&state),
    }
}

#[test]
fn fast_forward_reaches_the_same_terminal_state() {
    let normal = run_pressure(Duration::from_millis(500), false, 400);
    let fast = run_pressure(Duration::from_millis(500), true, 200);

    assert_eq!(normal.status, RunStatus::Won);
    assert_eq!(normal.lifepoints, 10, "both tanks reach the base");
    assert_eq!(normal.credits, 100 - 40 + 4 * 7);
    assert_eq!(normal, fast);
}

/// Multipliers that divide the base tick count of the long runs below.
const MULTIPLIERS: [u32; 12] = [1, 2, 3, 4, 5, 6, 8, 9, 10, 12, 16, 24];
const BASE_TICKS: u32 = 24 * 120;

#[test]
fn tick_size_does_not_change_the_outcome() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0dd5_ee1a_7c42_9b03);
    let base = Rules::default().tick_duration();
    let reference = run_pressure(base, false, BASE_TICKS);
    assert_eq!(reference.status, RunStatus::Won);

    for _ in 0..8 {
        let multiplier = MULTIPLIERS[rng.gen_range(0..MULTIPLIERS.len())];
        let outcome = run_pressure(base * multiplier, false, BASE_TICKS / multiplier);
        assert_eq!(
            outcome.fingerprint(),
            reference.fingerprint(),
            "outcome diverged at {multiplier}x tick size: {outcome:?}"
        );
    }
}

/// Short-range tower beside a long corridor, so enemies cross its range
/// within a single fast-forwarded tick.
fn run_crossing(multiplier: u32) -> Outcome {
    let levels = vec![LevelDefinition::new(
        corridor(20, 40.0),
        vec![
            spawns(&[
                (EnemyKind::Math, 0),
                (EnemyKind::Math, 700),
                (EnemyKind::Math, 1_400),
            ]),
            spawns(&[(EnemyKind::Math, 0), (EnemyKind::Math, 300)]),
            spawns(&[(EnemyKind::Math, 0)]),
        ],
    )];
    let catalogue = catalogue(
        &[(EnemyKind::Math, enemy(30, 40.0, 7, 5))],
        tower(20, 60.0, 10, Duration::from_millis(500)),
    );
    let mut state = game(levels, catalogue, Rules::default());
    let _ = state
        .place_tower(TowerKind::Math, TileCoord::new(10, 1))
        .expect("buildable tile");
    state.play();

    let dt = state.rules().tick_duration() * multiplier;
    let ticks = 48 * 24 / multiplier;
    for _ in 0..ticks {
        state.update(dt);
    }

    Outcome {
        status: state.status(),
        credits: state.credits(),
        lifepoints: state.lifepoints(),
        remaining_enemies: query::enemy_count(&state),
    }
}

#[test]
fn enemies_crossing_a_short_range_are_shot_at_every_speed() {
    let reference = run_crossing(1);
    assert!(reference.credits > 80, "the tower scores kills");

    for multiplier in [6, 12, 24] {
        assert_eq!(
            run_crossing(multiplier),
            reference,
            "outcome diverged at {multiplier}x"
        );
    }
}

fn scripted_events() -> Vec<Event> {
    let (levels, catalogue) = pressure_campaign();
    let mut state = game(levels, catalogue, Rules::default());
    let mut log = state.drain_events();

    state.enqueue(Command::PlaceTower {
        kind: TowerKind::Hardware,
        tile: TileCoord::new(4, 1),
    });
    state.enqueue(Command::Play);
    for tick in 0..240 {
        if tick == 30 {
            state.enqueue(Command::ToggleFastForward);
        }
        if tick == 60 {
            state.enqueue(Command::PlaceTower {
                kind: TowerKind::Math,
                tile: TileCoord::new(8, 1),
            });
        }
        let delta = state
            .rules()
            .scale_delta(state.rules().tick_duration(), state.is_fast_forward());
        state.update(delta);
        log.extend(state.drain_events());
    }
    log
}

#[test]
fn replaying_a_script_yields_identical_events() {
    let first = scripted_events();
    let second = scripted_events();

    let fingerprint = |events: &[Event]| {
        let mut hasher = DefaultHasher::new();
        format!("{events:?}").hash(&mut hasher);
        hasher.finish()
    };
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::TowerFired { .. })));
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

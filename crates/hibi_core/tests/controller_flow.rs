use hibi_core::controller::TIMER_CATEGORY;
use hibi_core::{
    AppConfig, Controller, EntryFields, EntryFlag, EntryId, Filter, FixedClock, IdGenerator,
    InputError, InsertPosition, KvStore, MemoryKv, Outcome, SequentialIds, SortOrder, TimerError,
    TimerPhase,
};

fn config() -> AppConfig {
    AppConfig::new("todo")
}

fn start(kv: MemoryKv, clock: &FixedClock) -> Controller<MemoryKv, SequentialIds, &FixedClock> {
    Controller::start(config(), kv, SequentialIds::new("t"), clock).unwrap()
}

#[test]
fn startup_renders_empty_state() {
    let clock = FixedClock::at(0);
    let controller = start(MemoryKv::new(), &clock);
    assert!(controller.entries().is_empty());
    assert!(controller.view().contains("まだ記録がありません"));
}

#[test]
fn submit_saves_and_renders() {
    let clock = FixedClock::at(1_704_067_200_000);
    let mut controller = start(MemoryKv::new(), &clock);

    let outcome = controller.submit(EntryFields::text("  散歩  ").with_category(" 運動 "));
    assert_eq!(outcome, Outcome::Applied);

    let entry = &controller.entries()[0];
    assert_eq!(entry.text, "散歩");
    assert_eq!(entry.category.as_deref(), Some("運動"));
    assert!(controller.view().contains("<span class=\"text\">散歩</span>"));
    assert!(controller.view().contains("2024/01/01(月)"));

    let stored = controller.persistence().kv().get("todo_v1").unwrap().unwrap();
    assert!(stored.contains("散歩"));
}

#[test]
fn blank_submit_is_rejected_with_cue_and_no_save() {
    let clock = FixedClock::at(0);
    let mut controller = start(MemoryKv::new(), &clock);

    let outcome = controller.submit(EntryFields::text("   "));
    assert_eq!(outcome, Outcome::Rejected(InputError::EmptyText));
    assert!(controller.entries().is_empty());
    assert!(controller.view().contains("class=\"input-cue\""));
    assert_eq!(controller.persistence().kv().get("todo_v1").unwrap(), None);

    assert!(controller.submit(EntryFields::text("ok")).is_applied());
    assert!(!controller.view().contains("class=\"input-cue\""));
}

struct ConstantIds;

impl IdGenerator for ConstantIds {
    fn next_id(&self) -> EntryId {
        EntryId::new("only")
    }
}

#[test]
fn submit_without_a_free_id_is_rejected_and_not_saved() {
    let clock = FixedClock::at(0);
    let mut controller = Controller::start(config(), MemoryKv::new(), ConstantIds, &clock).unwrap();
    assert!(controller.submit(EntryFields::text("first")).is_applied());
    let saved = controller.persistence().kv().get("todo_v1").unwrap();

    let outcome = controller.submit(EntryFields::text("second"));
    assert_eq!(outcome, Outcome::Rejected(InputError::IdUnavailable));
    assert_eq!(controller.entries().len(), 1);
    assert_eq!(controller.persistence().kv().get("todo_v1").unwrap(), saved);
    assert!(controller.view().contains(&InputError::IdUnavailable.cue()));
}

#[test]
fn overlong_text_is_rejected() {
    let clock = FixedClock::at(0);
    let mut config = config();
    config.max_text_chars = 4;
    let mut controller =
        Controller::start(config, MemoryKv::new(), SequentialIds::new("t"), &clock).unwrap();

    let outcome = controller.submit(EntryFields::text("12345"));
    assert!(matches!(
        outcome,
        Outcome::Rejected(InputError::TextTooLong { max_chars: 4, .. })
    ));
}

#[test]
fn edit_toggle_remove_and_reload() {
    let clock = FixedClock::at(0);
    let mut controller = start(MemoryKv::new(), &clock);
    controller.submit(EntryFields::text("a"));
    controller.submit(EntryFields::text("b"));

    let a = EntryId::new("t-1");
    let b = EntryId::new("t-2");
    assert!(controller.edit_text(&a, "A").is_applied());
    assert!(controller.toggle(&b, EntryFlag::Done).is_applied());
    assert_eq!(
        controller.edit_text(&a, ""),
        Outcome::Rejected(InputError::EmptyText)
    );
    assert!(controller.remove(&EntryId::new("missing")).is_applied());

    let kv = controller.persistence().kv().clone();
    let reloaded = start(kv, &clock);
    let texts: Vec<_> = reloaded.entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "b"]);
    assert!(reloaded.entries()[1].done);

    let mut reloaded = reloaded;
    reloaded.remove(&a);
    assert!(reloaded.entries().iter().all(|entry| entry.id != a));
}

#[test]
fn corrupt_storage_starts_empty() {
    let mut kv = MemoryKv::new();
    kv.set("todo_v1", "{not json").unwrap();
    kv.set("todo.prefs_v1", "###").unwrap();

    let clock = FixedClock::at(0);
    let controller = start(kv, &clock);
    assert!(controller.entries().is_empty());
    assert_eq!(controller.view_state().filter, Filter::All);
}

#[test]
fn rendering_is_idempotent() {
    let clock = FixedClock::at(0);
    let mut controller = start(MemoryKv::new(), &clock);
    controller.submit(EntryFields::text("<script>alert(1)</script>"));

    let first = controller.view().to_string();
    controller.dismiss_cue();
    let kv = controller.persistence().kv().clone();
    let again = start(kv, &clock);

    assert_eq!(first, again.view());
    assert!(!first.contains("<script>"));
}

#[test]
fn filter_is_remembered_across_sessions() {
    let clock = FixedClock::at(0);
    let mut controller = start(MemoryKv::new(), &clock);
    controller.submit(EntryFields::text("open"));
    controller.submit(EntryFields::text("closed"));
    controller.toggle(&EntryId::new("t-2"), EntryFlag::Done);

    controller.set_filter(Filter::Done);
    assert!(controller.view().contains("closed"));
    assert!(!controller.view().contains(">open<"));

    let kv = controller.persistence().kv().clone();
    let reloaded = start(kv, &clock);
    assert_eq!(reloaded.view_state().filter, Filter::Done);
}

#[test]
fn apps_sharing_one_store_keep_their_records_apart() {
    let clock = FixedClock::at(0);
    let mut neighbour = Controller::start(
        AppConfig::new("todo-prefs"),
        MemoryKv::new(),
        SequentialIds::new("n"),
        &clock,
    )
    .unwrap();
    neighbour.submit(EntryFields::text("important"));

    let mut todo = start(neighbour.persistence().kv().clone(), &clock);
    todo.set_filter(Filter::Done);
    let kv = todo.persistence().kv().clone();

    let neighbour = Controller::start(
        AppConfig::new("todo-prefs"),
        kv.clone(),
        SequentialIds::new("n"),
        &clock,
    )
    .unwrap();
    assert_eq!(neighbour.entries().len(), 1);
    assert_eq!(neighbour.entries()[0].text, "important");
    assert_eq!(neighbour.view_state().filter, Filter::All);

    let todo = start(kv, &clock);
    assert_eq!(todo.view_state().filter, Filter::Done);
}

#[test]
fn prepend_and_newest_first_config() {
    let clock = FixedClock::at(0);
    let mut config = config();
    config.insert_position = InsertPosition::Prepend;
    config.sort_order = SortOrder::NewestFirst;
    let mut controller =
        Controller::start(config, MemoryKv::new(), SequentialIds::new("t"), &clock).unwrap();

    controller.submit(EntryFields::text("first"));
    clock.advance(1_000);
    controller.submit(EntryFields::text("second"));

    assert_eq!(controller.entries()[0].text, "second");
    let view = controller.view();
    let first_pos = view.find("first").unwrap();
    let second_pos = view.find("second").unwrap();
    assert!(second_pos < first_pos);
}

#[test]
fn countdown_timer_records_entry_and_auto_resets() {
    let clock = FixedClock::at(0);
    let mut controller = start(MemoryKv::new(), &clock).with_reset_delay(180_000);

    controller.start_timer("読書", Some(60_000)).unwrap();
    assert_eq!(
        controller.start_timer("again", None),
        Err(TimerError::InvalidTransition {
            from: TimerPhase::Running,
            action: hibi_core::controller::TimerAction::Start,
        })
    );

    clock.advance(30_000);
    assert_eq!(controller.tick(), None);
    clock.advance(40_000);
    let run = controller.tick().unwrap();
    assert_eq!(run.stopped_at, 60_000);
    assert_eq!(controller.timer().phase(), TimerPhase::Completed);

    let entry = &controller.entries()[0];
    assert_eq!(entry.text, "読書");
    assert_eq!(entry.category.as_deref(), Some(TIMER_CATEGORY));
    assert_eq!(entry.duration_ms(), Some(60_000));
    assert!(controller.view().contains("01:00"));
    assert!(controller.pending_reset().is_pending());

    clock.advance(180_000);
    assert_eq!(controller.tick(), None);
    assert_eq!(controller.timer().phase(), TimerPhase::Idle);
    assert!(!controller.pending_reset().is_pending());
}

#[test]
fn stopwatch_finish_and_acknowledge() {
    let clock = FixedClock::at(1_000);
    let mut controller = start(MemoryKv::new(), &clock);

    assert!(controller.finish_timer().is_err());
    controller.start_timer("  ", None).unwrap();
    clock.advance(5_000);
    controller.pause_timer().unwrap();
    clock.advance(10_000);
    controller.resume_timer().unwrap();
    clock.advance(5_000);

    let run = controller.finish_timer().unwrap();
    assert_eq!(run.elapsed_ms, 10_000);
    assert_eq!(controller.entries()[0].text, "タイマー");

    controller.acknowledge_timer().unwrap();
    assert_eq!(controller.timer().phase(), TimerPhase::Idle);
    assert!(!controller.pending_reset().is_pending());
}

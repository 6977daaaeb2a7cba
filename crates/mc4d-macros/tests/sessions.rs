use mc4d_macros::prelude::*;

// A generic triple: no coordinate is zero in all three, so each current
// orientation matches exactly one symmetry.
const REFS: [Vec4; 3] = [[3, 2, 0, -2], [2, 3, -2, 0], [0, -2, 3, 2]];

fn recorded_macro(mgr: &mut MacroManager) -> MacroId {
    let id = mgr.create("sune", REFS).unwrap();
    mgr.open(id, REFS, OpenMode::Writing, 1).unwrap();
    let moves = [
        ([3, 0, 0, 0], 1, 1),
        ([0, 3, 2, 0], -1, 2),
        ([0, 0, -2, -3], 1, 3),
        ([-2, 0, -3, 2], -1, 1),
    ];
    for (coords, dir, slices) in moves {
        assert_eq!(
            mgr.record_move(Grip::new(coords), dir, slices).unwrap(),
            Recorded::Appended
        );
    }
    mgr.close();
    id
}

fn play_all(mgr: &mut MacroManager) -> Vec<MoveRecord> {
    let mut out = Vec::new();
    loop {
        match mgr.play_move().unwrap() {
            Playback::Move(m) => out.push(m),
            Playback::EndOfMacro => return out,
        }
    }
}

fn current_refs(m: &Mat4) -> [Vec4; 3] {
    REFS.map(|r| m.apply(&r))
}

#[test]
fn identity_orientation_replays_moves_unchanged() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);
    let recorded = mgr.get(id).unwrap().moves().records().to_vec();

    mgr.open(id, REFS, OpenMode::Reading, 1).unwrap();
    let r = mgr.reading_reorientation().unwrap();
    assert_eq!(r.matrix, Mat4::identity());
    assert_eq!(r.det, 1);
    assert_eq!(play_all(&mut mgr), recorded);
    mgr.close();
}

#[test]
fn end_of_macro_then_rewind() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);
    let first = mgr.get(id).unwrap().moves().records()[0];

    mgr.open(id, REFS, OpenMode::Reading, 1).unwrap();
    for _ in 0..4 {
        assert!(matches!(mgr.play_move().unwrap(), Playback::Move(_)));
    }
    assert_eq!(mgr.play_move().unwrap(), Playback::EndOfMacro);
    assert_eq!(mgr.play_move().unwrap(), Playback::EndOfMacro);

    mgr.get_mut(id).unwrap().goto_beginning();
    assert_eq!(mgr.play_move().unwrap(), Playback::Move(first));
}

#[test]
fn every_symmetry_replays_onto_the_current_frame() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);
    let recorded = mgr.get(id).unwrap().moves().records().to_vec();

    for g in hyperoctahedral_group() {
        mgr.open(id, current_refs(g), OpenMode::Reading, 1).unwrap();
        assert_eq!(mgr.reading_reorientation().unwrap().det, g.det());
        let played = play_all(&mut mgr);
        mgr.close();

        assert_eq!(played.len(), recorded.len());
        for (p, r) in played.iter().zip(&recorded) {
            assert_eq!(p.grip, r.grip.transformed(g));
            assert_eq!(p.direction, r.direction * g.det());
            assert_eq!(p.slices, r.slices);
            assert!(mgr.geometry().is_valid_grip(&p.grip.coords));
        }
    }
}

#[test]
fn reflection_reverses_directions_relative_to_rotation() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);
    let flip_w = Mat4::signed_permutation([0, 1, 2, 3], [1, 1, 1, -1]);

    for g in hyperoctahedral_group().iter().filter(|g| g.det() == -1) {
        let rotation = g.then(&flip_w);
        assert_eq!(rotation.det(), 1);

        mgr.open(id, current_refs(g), OpenMode::Reading, 1).unwrap();
        let mirrored = play_all(&mut mgr);
        mgr.close();
        mgr.open(id, current_refs(&rotation), OpenMode::Reading, 1).unwrap();
        let rotated = play_all(&mut mgr);
        mgr.close();

        for (m, r) in mirrored.iter().zip(&rotated) {
            assert_eq!(m.direction, -r.direction);
            assert_eq!(m.slices, r.slices);
        }
    }
}

#[test]
fn reverse_playback_undoes_the_macro() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);
    let recorded = mgr.get(id).unwrap().moves().records().to_vec();

    mgr.open(id, REFS, OpenMode::Reading, -1).unwrap();
    let played = play_all(&mut mgr);
    let expected: Vec<MoveRecord> = recorded.iter().rev().map(MoveRecord::inverse).collect();
    assert_eq!(played, expected);
}

#[test]
fn no_session_behaviour() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);

    let outcome = mgr.record_move(Grip::new([3, 0, 0, 0]), 1, 1).unwrap();
    assert_eq!(outcome, Recorded::NoSession);
    assert_eq!(mgr.get(id).unwrap().len(), 4);

    let err = mgr.play_move().unwrap_err();
    assert_eq!(err.code, ErrorCode::NoSession);
}

#[test]
fn unmatchable_orientation_refuses_to_open() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);

    // right stickers, wrong arrangement: swapping two refs is not a symmetry image
    let swapped = [REFS[1], REFS[0], [3, 2, 2, 0]];
    let err = mgr.open(id, swapped, OpenMode::Reading, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoMatchingOrientation);
    assert_eq!(mgr.reading(), None);
    assert_eq!(mgr.play_move().unwrap_err().code, ErrorCode::NoSession);

    let flat = [REFS[0], REFS[0], REFS[1]];
    let err = mgr.open(id, flat, OpenMode::Reading, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::DegenerateFrame);
    assert_eq!(mgr.reading(), None);
}

#[test]
fn off_puzzle_current_refs_refuse_to_open() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);

    let big = 2_000_000;
    for current in [
        [[big, 0, 0, 0], [0, big, 0, 0], [0, 0, big, 0]],
        [[i32::MIN, 0, 0, 0], [0, i32::MAX, 0, 0], [0, 0, 3, 0]],
        [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0]],
    ] {
        let err = mgr.open(id, current, OpenMode::Reading, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidGrip);
        assert_eq!(mgr.reading(), None);
    }
    mgr.open(id, REFS, OpenMode::Reading, 1).unwrap();
}

#[test]
fn recording_resumes_at_the_end() {
    let mut mgr = MacroManager::hypercube(3);
    let id = recorded_macro(&mut mgr);
    mgr.get_mut(id).unwrap().goto_beginning();

    mgr.open(id, REFS, OpenMode::Writing, 1).unwrap();
    mgr.record_move(Grip::new([0, 0, 0, 3]), -1, 7).unwrap();
    mgr.close();

    let m = mgr.get(id).unwrap();
    assert_eq!(m.len(), 5);
    assert_eq!(m.moves().records()[4].grip.coords, [0, 0, 0, 3]);
}

#[test]
fn invalid_moves_are_rejected_while_recording() {
    let mut mgr = MacroManager::hypercube(3);
    let id = mgr.create("empty", REFS).unwrap();
    mgr.open(id, REFS, OpenMode::Writing, 1).unwrap();
    assert_eq!(
        mgr.record_move(Grip::new([2, 2, 2, 2]), 1, 1).unwrap_err().code,
        ErrorCode::InvalidGrip
    );
    assert_eq!(
        mgr.record_move(Grip::new([3, 0, 0, 0]), 0, 1).unwrap_err().code,
        ErrorCode::InvalidMove
    );
    assert!(mgr.get(id).unwrap().is_empty());
}

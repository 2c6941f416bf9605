use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use test_case::test_case;

use hostel_allotment::allotment::{
    allot_rooms, Allotment, AllotmentOptions, PriorityPass, RoomAllotter, RoomDistribution,
};
use hostel_allotment::roster::{FieldMapping, FieldRole, StudentRecord};

fn mapping() -> FieldMapping {
    FieldMapping::new()
        .with(FieldRole::RollNo, "Roll No")
        .with(FieldRole::Name, "Name")
        .with(FieldRole::Gender, "Gender")
        .with(FieldRole::Soe, "SOE")
}

fn student(roll: &str, gender: &str, soe: &str) -> StudentRecord {
    HashMap::from([
        ("Roll No".to_string(), roll.to_string()),
        ("Name".to_string(), format!("Student {roll}")),
        ("Gender".to_string(), gender.to_string()),
        ("SOE".to_string(), soe.to_string()),
    ])
}

/// Mixed roster: every 4th student female, every 3rd "Home State".
fn roster(size: usize) -> Vec<StudentRecord> {
    (0..size)
        .map(|i| {
            let gender = if i % 4 == 0 { "Female" } else { "Male" };
            let soe = if i % 3 == 0 { "Home State" } else { "Other State" };
            student(&format!("R{i:03}"), gender, soe)
        })
        .collect()
}

fn run(
    students: &[StudentRecord],
    distribution: &RoomDistribution,
    options: &AllotmentOptions,
    seed: u64,
) -> Allotment {
    let mapping = mapping();
    RoomAllotter::new(distribution, &mapping, options)
        .allot_with_rng(students, &mut StdRng::seed_from_u64(seed))
}

fn eligible(students: &[StudentRecord], gender: &str) -> usize {
    students
        .iter()
        .filter(|s| s["Gender"].to_lowercase() == gender.to_lowercase())
        .count()
}

#[test_case(10, r#"{"2": 3}"# ; "shortfall")]
#[test_case(40, r#"{"4": 4, "3": 5}"# ; "mixed sizes")]
#[test_case(60, r#"{"1": 2, "6": 10}"# ; "surplus")]
#[test_case(7, r#"{"3": 1}"# ; "single room")]
fn capacity_duplication_gender_and_conservation(size: usize, distribution: &str) {
    let students = roster(size);
    let distribution = RoomDistribution::from_json(distribution).unwrap();
    let options = AllotmentOptions::new("male");

    for seed in 0..20 {
        let allotment = run(&students, &distribution, &options, seed);

        assert_eq!(allotment.rooms.len(), distribution.total_rooms());

        let mut seen = HashSet::new();
        for room in &allotment.rooms {
            assert!(room.students.len() <= room.capacity);
            for s in &room.students {
                assert_eq!(s.gender.to_lowercase(), "male");
                assert!(seen.insert(s.roll_no.clone()), "{} placed twice", s.roll_no);
            }
        }
        for s in &allotment.unplaced {
            assert!(seen.insert(s.roll_no.clone()), "{} both placed and unplaced", s.roll_no);
        }

        let cohort = eligible(&students, "male");
        assert_eq!(
            allotment.placed_count(),
            cohort.min(distribution.total_capacity())
        );
        assert_eq!(allotment.cohort_size(), cohort);
    }
}

#[test_case(PriorityPass::Literal)]
#[test_case(PriorityPass::SkipFull)]
fn every_room_gets_a_priority_student_when_there_are_enough(pass: PriorityPass) {
    // 12 Home State males across 3 + 2 rooms.
    let students: Vec<StudentRecord> = (0..20)
        .map(|i| {
            let soe = if i < 12 { "HOME STATE" } else { "Other State" };
            student(&i.to_string(), "male", soe)
        })
        .collect();
    let distribution = RoomDistribution::new([(2, 3), (4, 2)]).unwrap();
    let options = AllotmentOptions::new("Male").with_priority_pass(pass);

    for seed in 0..20 {
        let allotment = run(&students, &distribution, &options, seed);
        for room in &allotment.rooms {
            assert!(
                room.students.iter().any(|s| s.soe.eq_ignore_ascii_case("home state")),
                "room {} has no priority student",
                room.room_no
            );
        }
    }
}

#[test]
fn priority_students_seed_rooms_in_input_order() {
    let students = vec![
        student("H1", "male", "Home State"),
        student("O1", "male", "Other State"),
        student("H2", "male", "Home State"),
    ];
    let distribution = RoomDistribution::new([(1, 2)]).unwrap();
    let options = AllotmentOptions::new("male");

    let allotment = run(&students, &distribution, &options, 5);

    assert_eq!(allotment.rooms[0].students[0].roll_no, "H1");
    assert_eq!(allotment.rooms[1].students[0].roll_no, "H2");
    assert_eq!(allotment.unplaced.len(), 1);
    assert_eq!(allotment.unplaced[0].roll_no, "O1");
}

#[test]
fn three_males_in_two_double_rooms() {
    let students = vec![
        student("1", "male", "Home State"),
        student("2", "female", "Home State"),
        student("3", "male", "Home State"),
        student("4", "female", "Other State"),
        student("5", "male", "Other State"),
    ];
    let distribution = RoomDistribution::from_json(r#"{"2": 2}"#).unwrap();
    let options = AllotmentOptions::new("male");

    for seed in 0..10 {
        let allotment = run(&students, &distribution, &options, seed);

        assert_eq!(allotment.rooms.len(), 2);
        assert_eq!(allotment.rooms[0].students[0].roll_no, "1");
        assert_eq!(allotment.rooms[1].students[0].roll_no, "3");

        let mut sizes: Vec<usize> = allotment.rooms.iter().map(|r| r.students.len()).collect();
        sizes.sort();
        assert_eq!(sizes, vec![1, 2]);
        assert!(allotment.unplaced.is_empty());
    }
}

#[test]
fn single_bed_two_students_drops_one() {
    let students = vec![
        student("A", "male", "Other State"),
        student("B", "male", "Other State"),
    ];
    let distribution = RoomDistribution::from_json(r#"{"1": 1}"#).unwrap();
    let options = AllotmentOptions::new("male");

    let mut chosen = HashSet::new();
    for seed in 0..50 {
        let allotment = run(&students, &distribution, &options, seed);
        assert_eq!(allotment.rooms.len(), 1);
        assert_eq!(allotment.rooms[0].capacity, 1);
        assert_eq!(allotment.rooms[0].students.len(), 1);
        assert_eq!(allotment.unplaced.len(), 1);
        chosen.insert(allotment.rooms[0].students[0].roll_no.clone());
    }
    // The shuffle decides who gets the bed.
    assert_eq!(chosen.len(), 2);
}

#[test]
fn no_rooms_means_no_output_rooms() {
    let students = roster(12);
    let distribution = RoomDistribution::from_json("{}").unwrap();
    let options = AllotmentOptions::new("male");

    let allotment = run(&students, &distribution, &options, 0);

    assert!(allotment.rooms.is_empty());
    assert_eq!(allotment.unplaced.len(), eligible(&students, "male"));
}

#[test]
fn huge_room_size_holds_the_whole_cohort() {
    let students = vec![student("1", "male", "Other State")];
    let distribution = RoomDistribution::from_json(r#"{"18446744073709551615": 1}"#).unwrap();
    let options = AllotmentOptions::new("male");

    let allotment = run(&students, &distribution, &options, 0);

    assert_eq!(allotment.rooms.len(), 1);
    assert_eq!(allotment.rooms[0].capacity, usize::MAX);
    assert_eq!(allotment.rooms[0].students[0].roll_no, "1");
    assert!(allotment.unplaced.is_empty());
}

#[test]
fn empty_cohort_is_an_empty_result() {
    let students = roster(12);
    let distribution = RoomDistribution::new([(2, 4)]).unwrap();
    let options = AllotmentOptions::new("other");

    let allotment = run(&students, &distribution, &options, 0);

    assert_eq!(allotment, Allotment::default());
}

#[test]
fn same_seed_same_manifest() {
    let students = roster(50);
    let distribution = RoomDistribution::new([(3, 6), (4, 4)]).unwrap();
    let options = AllotmentOptions::new("male");

    assert_eq!(
        run(&students, &distribution, &options, 99),
        run(&students, &distribution, &options, 99)
    );
}

#[test]
fn custom_priority_label() {
    let students = vec![
        student("1", "female", "Other State"),
        student("2", "female", "NRI"),
        student("3", "female", "Other State"),
    ];
    let distribution = RoomDistribution::new([(1, 1), (2, 1)]).unwrap();
    let options = AllotmentOptions::new("female").with_soe_priority("nri");

    let allotment = run(&students, &distribution, &options, 8);
    assert_eq!(allotment.rooms[0].students[0].roll_no, "2");
}

#[test]
fn default_random_source_respects_invariants() {
    let students = roster(30);
    let distribution = RoomDistribution::new([(2, 5), (3, 3)]).unwrap();
    let options = AllotmentOptions::new("male");

    let allotment = allot_rooms(&students, &distribution, &mapping(), &options);

    assert!(allotment.rooms.iter().all(|r| r.students.len() <= r.capacity));
    assert_eq!(allotment.placed_count(), eligible(&students, "male").min(19));
}

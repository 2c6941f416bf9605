use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use super::rng::make_rng;
use super::slots::{build_slots, next_open_slot, remaining_capacity};
use super::types::{
    AllottedRoom, AllottedStudent, Allotment, AllotmentOptions, PriorityPass, RoomDistribution,
    RoomSlot, Student,
};
use crate::roster::{FieldMapping, FieldRole, StudentRecord};

fn same_label(value: &str, label: &str) -> bool {
    value.trim().to_lowercase() == label.trim().to_lowercase()
}

fn field<'a>(record: &'a StudentRecord, column: Option<&str>) -> &'a str {
    column
        .and_then(|column| record.get(column))
        .map(String::as_str)
        .unwrap_or("")
}

/// Places one gender cohort into the rooms of a distribution.
pub struct RoomAllotter<'c> {
    distribution: &'c RoomDistribution,
    mapping: &'c FieldMapping,
    options: &'c AllotmentOptions,
}

impl<'c> RoomAllotter<'c> {
    pub fn new(
        distribution: &'c RoomDistribution,
        mapping: &'c FieldMapping,
        options: &'c AllotmentOptions,
    ) -> Self {
        Self {
            distribution,
            mapping,
            options,
        }
    }

    /// Resolves mapped fields and keeps rows whose gender matches the target.
    pub fn cohort<'a>(&self, students: &'a [StudentRecord]) -> Vec<Student<'a>> {
        let name = self.mapping.column(FieldRole::Name);
        let roll_no = self.mapping.column(FieldRole::RollNo);
        let gender = self.mapping.column(FieldRole::Gender);
        let soe = self.mapping.column(FieldRole::Soe);

        students
            .iter()
            .map(|record| Student {
                name: field(record, name),
                roll_no: field(record, roll_no),
                gender: field(record, gender),
                soe: field(record, soe),
                record,
            })
            .filter(|student| same_label(student.gender, &self.options.target_gender))
            .collect()
    }

    /// Runs the allotment with an OS-seeded shuffle.
    pub fn allot(&self, students: &[StudentRecord]) -> Allotment {
        let mut rng = make_rng(None);
        self.allot_with_rng(students, &mut rng)
    }

    /// Runs the allotment with the given random source for the remainder shuffle.
    ///
    /// Never fails: an empty cohort yields no rooms, and students that do not
    /// fit are reported in [`Allotment::unplaced`].
    pub fn allot_with_rng<R: Rng + ?Sized>(
        &self,
        students: &[StudentRecord],
        rng: &mut R,
    ) -> Allotment {
        let gender = &self.options.target_gender;
        let cohort = self.cohort(students);
        if cohort.is_empty() {
            warn!("No students found for gender {gender:?}");
            return Allotment::default();
        }

        if self.distribution.is_empty() {
            warn!("Room distribution is empty; all {} {gender} student(s) stay unplaced", cohort.len());
        }

        let mut slots = build_slots(self.distribution);
        debug!(
            "Built {} room(s) with {} bed(s) for {} {gender} student(s)",
            slots.len(),
            self.distribution.total_capacity(),
            cohort.len()
        );

        let (priority, others): (Vec<Student<'_>>, Vec<Student<'_>>) = cohort
            .into_iter()
            .partition(|student| same_label(student.soe, &self.options.soe_priority));

        if priority.len() < slots.len() {
            warn!(
                "Only {} {:?} student(s) for {} room(s); some rooms get no priority occupant",
                priority.len(),
                self.options.soe_priority,
                slots.len()
            );
        }

        let priority_total = priority.len();
        let mut remainder = seat_priority(&mut slots, priority, self.options.priority_pass);
        debug!(
            "Priority pass seated {} of {} student(s)",
            priority_total - remainder.len(),
            priority_total
        );

        remainder.extend(others);
        remainder.shuffle(rng);
        let unplaced = fill_remainder(&mut slots, remainder);

        if !unplaced.is_empty() {
            warn!(
                "{} {gender} student(s) left unplaced: not enough beds",
                unplaced.len()
            );
        }

        let allotment = Allotment {
            rooms: slots
                .iter()
                .enumerate()
                .map(|(index, slot)| AllottedRoom {
                    room_no: index + 1,
                    capacity: slot.capacity,
                    students: slot.occupants.iter().map(|s| self.shape(s)).collect(),
                })
                .collect(),
            unplaced: unplaced.iter().map(|s| self.shape(s)).collect(),
        };

        info!(
            "Allotted {} {gender} student(s) to {} room(s), {} unplaced, {} bed(s) free",
            allotment.placed_count(),
            allotment.rooms.len(),
            allotment.unplaced.len(),
            remaining_capacity(&slots)
        );

        allotment
    }

    fn shape(&self, student: &Student<'_>) -> AllottedStudent {
        let optional = |role: FieldRole| {
            self.mapping
                .column(role)
                .map(|column| field(student.record, Some(column)).to_string())
        };

        AllottedStudent {
            name: student.name.to_string(),
            roll_no: student.roll_no.to_string(),
            soe: student.soe.to_string(),
            gender: student.gender.to_string(),
            father_name: optional(FieldRole::FatherName),
            mother_name: optional(FieldRole::MotherName),
            program: optional(FieldRole::Program),
            extra: self
                .options
                .extra_fields
                .iter()
                .map(|key| (key.clone(), field(student.record, Some(key)).to_string()))
                .collect(),
        }
    }
}

/// One pass over the rooms in construction order, giving each at most one
/// priority student. Returns the priority students that were not seated.
pub fn seat_priority<'a>(
    slots: &mut [RoomSlot<'a>],
    priority: Vec<Student<'a>>,
    pass: PriorityPass,
) -> Vec<Student<'a>> {
    let mut leftover = Vec::new();
    let mut queue = priority.into_iter();

    match pass {
        PriorityPass::Literal => {
            for (slot, student) in slots.iter_mut().zip(queue.by_ref()) {
                if slot.has_space() {
                    slot.occupants.push(student);
                } else {
                    leftover.push(student);
                }
            }
        }
        PriorityPass::SkipFull => {
            for slot in slots.iter_mut().filter(|slot| slot.has_space()) {
                match queue.next() {
                    Some(student) => slot.occupants.push(student),
                    None => break,
                }
            }
        }
    }

    leftover.extend(queue);
    leftover
}

/// Places each student in the next room with a spare bed, round-robin.
/// Returns the students no room had space for.
pub fn fill_remainder<'a>(
    slots: &mut [RoomSlot<'a>],
    students: Vec<Student<'a>>,
) -> Vec<Student<'a>> {
    let mut cursor = 0;
    let mut unplaced = Vec::new();

    for student in students {
        match next_open_slot(slots, &mut cursor) {
            Some(index) => slots[index].occupants.push(student),
            None => unplaced.push(student),
        }
    }

    unplaced
}

/// Convenience wrapper around [`RoomAllotter::allot`].
pub fn allot_rooms(
    students: &[StudentRecord],
    distribution: &RoomDistribution,
    mapping: &FieldMapping,
    options: &AllotmentOptions,
) -> Allotment {
    RoomAllotter::new(distribution, mapping, options).allot(students)
}

use std::fmt;

use crate::allotment::{AllottedStudent, Allotment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllotmentSummary {
    pub rooms: usize,
    pub occupied_rooms: usize,
    pub capacity: usize,
    pub placed: usize,
    pub unplaced: usize,
}

impl fmt::Display for AllotmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} student(s) placed in {}/{} room(s), {} of {} bed(s) used, {} unplaced",
            self.placed, self.occupied_rooms, self.rooms, self.placed, self.capacity, self.unplaced
        )
    }
}

pub fn summarize(allotment: &Allotment) -> AllotmentSummary {
    AllotmentSummary {
        rooms: allotment.rooms.len(),
        occupied_rooms: allotment.rooms.iter().filter(|r| !r.students.is_empty()).count(),
        capacity: allotment.total_capacity(),
        placed: allotment.placed_count(),
        unplaced: allotment.unplaced.len(),
    }
}

/// Formats a student as `roll - name (soe)`
pub fn format_student(student: &AllottedStudent) -> String {
    if student.soe.is_empty() {
        format!("{} - {}", student.roll_no, student.name)
    } else {
        format!("{} - {} ({})", student.roll_no, student.name, student.soe)
    }
}

/// Prints the room manifest in a readable format
pub fn print_allotment(title: &str, allotment: &Allotment) {
    println!("\n=== {} ===", title);
    println!("{}", summarize(allotment));

    for room in &allotment.rooms {
        println!(
            "\nRoom {} ({}/{}):",
            room.room_no,
            room.students.len(),
            room.capacity
        );
        if room.students.is_empty() {
            println!("  [EMPTY]");
        }
        for student in &room.students {
            println!("  - {}", format_student(student));
        }
    }

    if !allotment.unplaced.is_empty() {
        println!("\n⚠️  Unplaced students ({}):", allotment.unplaced.len());
        for student in &allotment.unplaced {
            println!("  - {}", format_student(student));
        }
    }
}

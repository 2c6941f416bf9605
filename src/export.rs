use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use csv::WriterBuilder;

use crate::allotment::{AllottedStudent, Allotment, AllotmentOptions};
use crate::error::Result;
use crate::roster::{FieldMapping, FieldRole};

const UNPLACED: &str = "Unplaced";

fn header(optional: &[FieldRole], options: &AllotmentOptions) -> Vec<String> {
    let mut columns: Vec<String> = ["Room No", "Capacity"]
        .into_iter()
        .chain(
            [FieldRole::RollNo, FieldRole::Name, FieldRole::Gender, FieldRole::Soe]
                .iter()
                .map(FieldRole::label),
        )
        .map(String::from)
        .collect();
    columns.extend(optional.iter().map(|role| role.label().to_string()));
    columns.extend(options.extra_fields.iter().cloned());
    columns
}

fn student_row(
    room_no: &str,
    capacity: &str,
    student: &AllottedStudent,
    optional: &[FieldRole],
    options: &AllotmentOptions,
) -> Vec<String> {
    let mut row = vec![
        room_no.to_string(),
        capacity.to_string(),
        student.roll_no.clone(),
        student.name.clone(),
        student.gender.clone(),
        student.soe.clone(),
    ];
    for role in optional {
        let value = match role {
            FieldRole::FatherName => student.father_name.as_deref(),
            FieldRole::MotherName => student.mother_name.as_deref(),
            FieldRole::Program => student.program.as_deref(),
            _ => None,
        };
        row.push(value.unwrap_or_default().to_string());
    }
    for key in &options.extra_fields {
        row.push(student.extra.get(key).cloned().unwrap_or_default());
    }
    row
}

/// Writes the room manifest as a spreadsheet: one row per occupant, one
/// placeholder row per empty room, then the unplaced students.
pub fn write_allotment<W: Write>(
    writer: W,
    allotment: &Allotment,
    mapping: &FieldMapping,
    options: &AllotmentOptions,
) -> Result<()> {
    let optional = mapping.mapped_optional();
    let columns = header(&optional, options);

    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
    wtr.write_record(&columns)?;

    for room in &allotment.rooms {
        let room_no = room.room_no.to_string();
        let capacity = room.capacity.to_string();
        if room.students.is_empty() {
            wtr.write_record([room_no.as_str(), capacity.as_str()])?;
            continue;
        }
        for student in &room.students {
            wtr.write_record(student_row(&room_no, &capacity, student, &optional, options))?;
        }
    }

    for student in &allotment.unplaced {
        wtr.write_record(student_row(UNPLACED, "", student, &optional, options))?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn allotment_to_csv_bytes(
    allotment: &Allotment,
    mapping: &FieldMapping,
    options: &AllotmentOptions,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_allotment(&mut buffer, allotment, mapping, options)?;
    Ok(buffer)
}

pub fn write_allotment_to_file<P: AsRef<Path>>(
    path: P,
    allotment: &Allotment,
    mapping: &FieldMapping,
    options: &AllotmentOptions,
) -> Result<()> {
    let file = File::create(path)?;
    write_allotment(file, allotment, mapping, options)
}

/// e.g. `allotment_male_20240801_143000.csv`
pub fn export_filename(gender: &str, now: DateTime<Local>) -> String {
    let gender: String = gender
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let gender = if gender.is_empty() { "all".to_string() } else { gender };
    format!("allotment_{}_{}.csv", gender, now.format("%Y%m%d_%H%M%S"))
}

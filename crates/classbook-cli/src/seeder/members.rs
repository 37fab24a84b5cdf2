//! Student and Teacher seeding.

use std::time::Instant;

use chrono::Duration;
use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_db::checks::{MemberRefs, check_member_refs};
use classbook_models::validation::today;
use classbook_models::{
    AcademicLevel, Classroom, ClassroomId, DecimalInput, GradeId, MemberId, MemberInput, Money,
    StudentInput, TeacherInput,
};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::boolean::en::Boolean;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;

use super::random_subset;

const SEXES: [&str; 3] = ["M", "F", "O"];

/// Age bounds in years, inclusive of the lower bound.
struct AgeRange(i64, i64);

fn fake_member(id_doc: String, age: AgeRange, payment_cents: (i64, i64)) -> MemberInput {
    let days_old = (age.0 * 365..age.1 * 365).fake::<i64>();
    let active: bool = Boolean(90).fake();
    let departure_date = (!active).then(|| today() - Duration::days((1..365).fake::<i64>()));

    MemberInput {
        fullname: Name().fake(),
        id_doc,
        birthdate: Some(today() - Duration::days(days_old)),
        sex: SEXES[(0..SEXES.len()).fake::<usize>()].to_string(),
        monthly_payment: DecimalInput::from(Money::from_cents(
            (payment_cents.0..payment_cents.1).fake::<i64>(),
        )),
        active,
        departure_date,
        email: SafeEmail().fake(),
        phone_number: PhoneNumber().fake(),
        address: format!(
            "{} {}, {}",
            BuildingNumber().fake::<String>(),
            StreetName().fake::<String>(),
            CityName().fake::<String>()
        ),
    }
}

fn guardian_name() -> String {
    format!("{} {}", FirstName().fake::<String>(), LastName().fake::<String>())
}

/// Students attend up to three classrooms of their own Grade when it has
/// any, otherwise any classrooms.
pub fn generate_students(
    count: usize,
    tag: &str,
    grades: &[GradeId],
    classrooms: &[Classroom],
) -> Vec<StudentInput> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let grade = (!grades.is_empty()).then(|| grades[(0..grades.len()).fake::<usize>()]);
            let same_grade: Vec<ClassroomId> = classrooms
                .iter()
                .filter(|classroom| grade.is_some() && classroom.grade == grade)
                .map(|classroom| classroom.id)
                .collect();
            let pool: Vec<ClassroomId> = if same_grade.is_empty() {
                classrooms.iter().map(|classroom| classroom.id).collect()
            } else {
                same_grade
            };
            let has_second_guardian: bool = Boolean(50).fake();

            StudentInput {
                member: fake_member(
                    format!("ST-{}-{:05}", tag, i + 1),
                    AgeRange(5, 18),
                    (20_000, 150_000),
                ),
                grade,
                guardian1: guardian_name(),
                guardian2: if has_second_guardian {
                    guardian_name()
                } else {
                    String::new()
                },
                classes: random_subset(&pool, 3),
            }
        })
        .collect()
}

pub fn generate_teachers(count: usize, tag: &str, classrooms: &[Classroom]) -> Vec<TeacherInput> {
    let pool: Vec<ClassroomId> = classrooms.iter().map(|classroom| classroom.id).collect();

    (0..count)
        .into_par_iter()
        .map(|i| TeacherInput {
            member: fake_member(
                format!("TE-{}-{:05}", tag, i + 1),
                AgeRange(23, 65),
                (0, 1),
            ),
            academic_level: AcademicLevel::ALL[(0..AcademicLevel::ALL.len()).fake::<usize>()]
                .as_str()
                .to_string(),
            bank_agency: (1..10_000).fake::<i64>(),
            bank_account: (10_000..10_000_000).fake::<i64>(),
            classes: random_subset(&pool, 4),
        })
        .collect()
}

pub async fn insert_student(
    store: &dyn SchoolStore,
    input: StudentInput,
) -> Result<MemberId, AppError> {
    let mut errors = input.check();
    let refs = MemberRefs {
        id_doc: Some(&input.member.id_doc),
        grade: input.grade,
        classes: &input.classes,
    };
    check_member_refs(store, refs, None, &mut errors).await?;
    errors.into_result()?;
    Ok(store.create_student(input.into_data()?).await?.id())
}

pub async fn insert_teacher(
    store: &dyn SchoolStore,
    input: TeacherInput,
) -> Result<MemberId, AppError> {
    let mut errors = input.check();
    let refs = MemberRefs {
        id_doc: Some(&input.member.id_doc),
        grade: None,
        classes: &input.classes,
    };
    check_member_refs(store, refs, None, &mut errors).await?;
    errors.into_result()?;
    Ok(store.create_teacher(input.into_data()?).await?.id())
}

pub async fn seed_students(
    store: &dyn SchoolStore,
    count: usize,
    tag: &str,
    grades: &[GradeId],
    classrooms: &[Classroom],
) -> Result<Vec<MemberId>, AppError> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    let students = generate_students(count, tag, grades, classrooms);
    let mut ids = Vec::with_capacity(students.len());
    for input in students {
        ids.push(insert_student(store, input).await?);
    }

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn seed_teachers(
    store: &dyn SchoolStore,
    count: usize,
    tag: &str,
    classrooms: &[Classroom],
) -> Result<Vec<MemberId>, AppError> {
    let start_time = Instant::now();
    println!("👥 Seeding {} teachers...", count);

    let teachers = generate_teachers(count, tag, classrooms);
    let mut ids = Vec::with_capacity(teachers.len());
    for input in teachers {
        ids.push(insert_teacher(store, input).await?);
    }

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use classbook_models::DaysOfWeek;

    fn classroom(id: i64, grade: Option<i64>) -> Classroom {
        Classroom {
            id: ClassroomId::new(id),
            name: "Music".to_string(),
            identifier: format!("MUS-{}", id),
            room: "R1".to_string(),
            days_of_week: DaysOfWeek::new_unchecked("1,3"),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            grade: grade.map(GradeId::new),
        }
    }

    #[test]
    fn test_generated_students_pass_validation() {
        let students = generate_students(50, "t1", &[GradeId::new(1)], &[classroom(1, Some(1))]);
        assert_eq!(students.len(), 50);
        for student in &students {
            assert!(student.check().is_empty(), "{:?}", student.check());
            assert!(student.member.birthdate.unwrap() < today());
        }
    }

    #[test]
    fn test_students_take_classes_from_their_grade() {
        let classrooms = [classroom(1, Some(1)), classroom(2, Some(2))];
        let students = generate_students(20, "t1", &[GradeId::new(2)], &classrooms);
        for student in students {
            assert_eq!(student.classes, vec![ClassroomId::new(2)]);
        }
    }

    #[test]
    fn test_generated_teachers_pass_validation() {
        let teachers = generate_teachers(20, "t1", &[classroom(1, None), classroom(2, None)]);
        for teacher in &teachers {
            assert!(teacher.check().is_empty(), "{:?}", teacher.check());
            assert!(teacher.member.id_doc.starts_with("TE-t1-"));
        }
    }

    #[test]
    fn test_id_docs_are_unique_within_a_run() {
        let students = generate_students(30, "t1", &[], &[]);
        let mut id_docs: Vec<_> = students.iter().map(|s| s.member.id_doc.clone()).collect();
        id_docs.sort();
        id_docs.dedup();
        assert_eq!(id_docs.len(), 30);
    }
}

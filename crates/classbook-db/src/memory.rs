//! In-memory [`SchoolStore`], used when no database is configured and by the
//! test suite.
//!
//! All tables sit behind one `RwLock`, so every write happens under a single
//! exclusive guard and is trivially atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use classbook_core::{AppError, FieldErrors};
use classbook_models::validation::today;
use classbook_models::{
    Classroom, ClassroomData, ClassroomId, Grade, GradeData, GradeId, MemberId, SchoolMember,
    Student, StudentData, StudentQuery, Teacher, TeacherData, TeacherQuery, User, UserId,
};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::checks::{EMAIL_TAKEN, ID_DOC_TAKEN, IDENTIFIER_TAKEN, invalid_pk};
use crate::store::SchoolStore;

#[derive(Debug, Default)]
struct Tables {
    last_grade_id: i64,
    last_classroom_id: i64,
    last_member_id: i64,
    last_user_id: i64,
    grades: BTreeMap<GradeId, Grade>,
    classrooms: BTreeMap<ClassroomId, Classroom>,
    members: BTreeMap<MemberId, SchoolMember>,
    users: BTreeMap<UserId, User>,
}

impl Tables {
    fn next_member_id(&mut self) -> MemberId {
        self.last_member_id += 1;
        MemberId::new(self.last_member_id)
    }

    fn students(&self) -> impl Iterator<Item = &Student> {
        self.members.values().filter_map(|member| match member {
            SchoolMember::Student(student) => Some(student),
            SchoolMember::Teacher(_) => None,
        })
    }

    fn teachers(&self) -> impl Iterator<Item = &Teacher> {
        self.members.values().filter_map(|member| match member {
            SchoolMember::Teacher(teacher) => Some(teacher),
            SchoolMember::Student(_) => None,
        })
    }

    fn id_doc_taken(&self, id_doc: &str, except: Option<MemberId>) -> bool {
        self.members
            .values()
            .any(|member| member.member().id_doc == id_doc && Some(member.id()) != except)
    }

    fn identifier_taken(&self, identifier: &str, except: Option<ClassroomId>) -> bool {
        self.classrooms
            .values()
            .any(|classroom| classroom.identifier == identifier && Some(classroom.id) != except)
    }

    /// Same guarantees the database constraints give the Postgres store.
    fn check_member(
        &self,
        id_doc: &str,
        grade: Option<GradeId>,
        classes: &[ClassroomId],
        except: Option<MemberId>,
    ) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if self.id_doc_taken(id_doc, except) {
            errors.add("id_doc", ID_DOC_TAKEN);
        }
        if let Some(grade) = grade
            && !self.grades.contains_key(&grade)
        {
            errors.add("grade", invalid_pk(grade));
        }
        for id in classes {
            if !self.classrooms.contains_key(id) {
                errors.add("classes", invalid_pk(id));
            }
        }
        errors.into_result()
    }

    fn check_classroom(
        &self,
        data: &ClassroomData,
        except: Option<ClassroomId>,
    ) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if self.identifier_taken(&data.identifier, except) {
            errors.add("identifier", IDENTIFIER_TAKEN);
        }
        if let Some(grade) = data.grade
            && !self.grades.contains_key(&grade)
        {
            errors.add("grade", invalid_pk(grade));
        }
        errors.into_result()
    }
}

fn grade_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Grade not found"))
}

fn classroom_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Classroom not found"))
}

fn student_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Student not found"))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchoolStore for MemoryStore {
    async fn list_grades(&self) -> Result<Vec<Grade>, AppError> {
        let tables = self.tables.read().await;
        let mut grades: Vec<Grade> = tables.grades.values().cloned().collect();
        grades.sort_by_key(|grade| (grade.rank, grade.id));
        Ok(grades)
    }

    async fn get_grade(&self, id: GradeId) -> Result<Option<Grade>, AppError> {
        Ok(self.tables.read().await.grades.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn create_grade(&self, data: GradeData) -> Result<Grade, AppError> {
        let mut tables = self.tables.write().await;
        tables.last_grade_id += 1;
        let grade = Grade {
            id: GradeId::new(tables.last_grade_id),
            name: data.name,
            rank: data.rank,
        };
        tables.grades.insert(grade.id, grade.clone());
        Ok(grade)
    }

    #[instrument(skip(self))]
    async fn update_grade(&self, id: GradeId, data: GradeData) -> Result<Grade, AppError> {
        let mut tables = self.tables.write().await;
        let grade = tables.grades.get_mut(&id).ok_or_else(grade_not_found)?;
        grade.name = data.name;
        grade.rank = data.rank;
        Ok(grade.clone())
    }

    #[instrument(skip(self))]
    async fn delete_grade(&self, id: GradeId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.grades.remove(&id).ok_or_else(grade_not_found)?;

        for classroom in tables.classrooms.values_mut() {
            if classroom.grade == Some(id) {
                classroom.grade = None;
            }
        }
        for member in tables.members.values_mut() {
            if let SchoolMember::Student(student) = member
                && student.grade == Some(id)
            {
                student.grade = None;
            }
        }
        Ok(())
    }

    async fn list_classrooms(&self) -> Result<Vec<Classroom>, AppError> {
        let tables = self.tables.read().await;
        let mut classrooms: Vec<Classroom> = tables.classrooms.values().cloned().collect();
        classrooms.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(classrooms)
    }

    async fn get_classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, AppError> {
        Ok(self.tables.read().await.classrooms.get(&id).cloned())
    }

    async fn classrooms_by_ids(&self, ids: &[ClassroomId]) -> Result<Vec<Classroom>, AppError> {
        let tables = self.tables.read().await;
        let mut classrooms: Vec<Classroom> = tables
            .classrooms
            .values()
            .filter(|classroom| ids.contains(&classroom.id))
            .cloned()
            .collect();
        classrooms.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(classrooms)
    }

    #[instrument(skip(self))]
    async fn create_classroom(&self, data: ClassroomData) -> Result<Classroom, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_classroom(&data, None)?;

        tables.last_classroom_id += 1;
        let classroom = Classroom {
            id: ClassroomId::new(tables.last_classroom_id),
            name: data.name,
            identifier: data.identifier,
            room: data.room,
            days_of_week: data.days_of_week,
            time: data.time,
            grade: data.grade,
        };
        tables.classrooms.insert(classroom.id, classroom.clone());
        Ok(classroom)
    }

    #[instrument(skip(self))]
    async fn update_classroom(
        &self,
        id: ClassroomId,
        data: ClassroomData,
    ) -> Result<Classroom, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.classrooms.contains_key(&id) {
            return Err(classroom_not_found());
        }
        tables.check_classroom(&data, Some(id))?;

        let classroom = Classroom {
            id,
            name: data.name,
            identifier: data.identifier,
            room: data.room,
            days_of_week: data.days_of_week,
            time: data.time,
            grade: data.grade,
        };
        tables.classrooms.insert(id, classroom.clone());
        Ok(classroom)
    }

    #[instrument(skip(self))]
    async fn delete_classroom(&self, id: ClassroomId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.classrooms.remove(&id).ok_or_else(classroom_not_found)?;

        for member in tables.members.values_mut() {
            let classes = match member {
                SchoolMember::Student(student) => &mut student.classes,
                SchoolMember::Teacher(teacher) => &mut teacher.classes,
            };
            classes.retain(|class| *class != id);
        }
        Ok(())
    }

    async fn classroom_identifier_taken(
        &self,
        identifier: &str,
        except: Option<ClassroomId>,
    ) -> Result<bool, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .identifier_taken(identifier, except))
    }

    async fn id_doc_taken(
        &self,
        id_doc: &str,
        except: Option<MemberId>,
    ) -> Result<bool, AppError> {
        Ok(self.tables.read().await.id_doc_taken(id_doc, except))
    }

    async fn list_students(&self, query: &StudentQuery) -> Result<Vec<Student>, AppError> {
        let tables = self.tables.read().await;
        let mut students: Vec<Student> = tables
            .students()
            .filter(|student| query.matches(student))
            .cloned()
            .collect();
        students.sort_by(|a, b| {
            a.member
                .fullname
                .cmp(&b.member.fullname)
                .then(a.id().cmp(&b.id()))
        });
        Ok(students)
    }

    async fn get_student(&self, id: MemberId) -> Result<Option<Student>, AppError> {
        let tables = self.tables.read().await;
        Ok(match tables.members.get(&id) {
            Some(SchoolMember::Student(student)) => Some(student.clone()),
            _ => None,
        })
    }

    #[instrument(skip(self, data))]
    async fn create_student(&self, data: StudentData) -> Result<Student, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_member(&data.member.id_doc, data.grade, &data.classes, None)?;

        let id = tables.next_member_id();
        let student = Student::from_data(id, today(), data);
        tables
            .members
            .insert(id, SchoolMember::Student(student.clone()));
        Ok(student)
    }

    #[instrument(skip(self, data))]
    async fn update_student(&self, id: MemberId, data: StudentData) -> Result<Student, AppError> {
        let mut tables = self.tables.write().await;
        let register_date = match tables.members.get(&id) {
            Some(SchoolMember::Student(student)) => student.member.register_date,
            _ => return Err(student_not_found()),
        };
        tables.check_member(&data.member.id_doc, data.grade, &data.classes, Some(id))?;

        let student = Student::from_data(id, register_date, data);
        tables
            .members
            .insert(id, SchoolMember::Student(student.clone()));
        Ok(student)
    }

    async fn list_teachers(&self, query: &TeacherQuery) -> Result<Vec<Teacher>, AppError> {
        let tables = self.tables.read().await;
        let mut teachers: Vec<Teacher> = tables
            .teachers()
            .filter(|teacher| query.matches(teacher))
            .cloned()
            .collect();
        teachers.sort_by(|a, b| {
            a.member
                .fullname
                .cmp(&b.member.fullname)
                .then(a.id().cmp(&b.id()))
        });
        Ok(teachers)
    }

    async fn get_teacher(&self, id: MemberId) -> Result<Option<Teacher>, AppError> {
        let tables = self.tables.read().await;
        Ok(match tables.members.get(&id) {
            Some(SchoolMember::Teacher(teacher)) => Some(teacher.clone()),
            _ => None,
        })
    }

    #[instrument(skip(self, data))]
    async fn create_teacher(&self, data: TeacherData) -> Result<Teacher, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_member(&data.member.id_doc, None, &data.classes, None)?;

        let id = tables.next_member_id();
        let teacher = Teacher::from_data(id, today(), data);
        tables
            .members
            .insert(id, SchoolMember::Teacher(teacher.clone()));
        Ok(teacher)
    }

    #[instrument(skip(self, password_hash))]
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.email == email) {
            return Err(AppError::invalid_field("email", EMAIL_TAKEN));
        }

        tables.last_user_id += 1;
        let user = User {
            id: UserId::new(tables.last_user_id),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn clear_school_data(&self) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.members.clear();
        tables.classrooms.clear();
        tables.grades.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use classbook_models::{AcademicLevel, DaysOfWeek, MemberData, Money, Sex};

    fn member(fullname: &str, id_doc: &str, active: bool) -> MemberData {
        MemberData {
            fullname: fullname.to_string(),
            id_doc: id_doc.to_string(),
            birthdate: NaiveDate::from_ymd_opt(2011, 9, 1).unwrap(),
            sex: Sex::Other,
            monthly_payment: Money::from_cents(10_000),
            active,
            departure_date: None,
            email: "member@example.com".to_string(),
            phone_number: "555-0000".to_string(),
            address: "Somewhere".to_string(),
        }
    }

    fn student(
        fullname: &str,
        id_doc: &str,
        grade: Option<GradeId>,
        classes: Vec<ClassroomId>,
    ) -> StudentData {
        StudentData {
            member: member(fullname, id_doc, true),
            grade,
            guardian1: "Guardian".to_string(),
            guardian2: String::new(),
            classes,
        }
    }

    fn classroom(identifier: &str) -> ClassroomData {
        ClassroomData {
            name: "Class".to_string(),
            identifier: identifier.to_string(),
            room: "R1".to_string(),
            days_of_week: DaysOfWeek::new_unchecked("1,3"),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            grade: None,
        }
    }

    async fn grade(store: &MemoryStore, rank: i32) -> Grade {
        store
            .create_grade(GradeData {
                name: format!("Grade {rank}"),
                rank,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_grades_ordered_by_rank() {
        let store = MemoryStore::new();
        grade(&store, 3).await;
        grade(&store, 1).await;
        grade(&store, 2).await;

        let ranks: Vec<i32> = store
            .list_grades()
            .await
            .unwrap()
            .iter()
            .map(|g| g.rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_students_and_teachers_share_id_sequence() {
        let store = MemoryStore::new();
        let s = store
            .create_student(student("Ana", "1", None, vec![]))
            .await
            .unwrap();
        let t = store
            .create_teacher(TeacherData {
                member: member("Beto", "2", true),
                academic_level: AcademicLevel::Graduate,
                bank_agency: 1,
                bank_account: 2,
                classes: vec![],
            })
            .await
            .unwrap();
        assert_eq!(s.id(), MemberId::new(1));
        assert_eq!(t.id(), MemberId::new(2));
        assert_eq!(store.get_student(t.id()).await.unwrap(), None);
        assert_eq!(store.get_teacher(s.id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_id_doc_leaves_store_unchanged() {
        let store = MemoryStore::new();
        store
            .create_student(student("Ana", "X-1", None, vec![]))
            .await
            .unwrap();

        let err = store
            .create_teacher(TeacherData {
                member: member("Beto", "X-1", true),
                academic_level: AcademicLevel::Master,
                bank_agency: 0,
                bank_account: 0,
                classes: vec![],
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(
            store
                .list_teachers(&TeacherQuery::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            store
                .list_students(&StudentQuery::default())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_unknown_references_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_student(student(
                "Ana",
                "1",
                Some(GradeId::new(9)),
                vec![ClassroomId::new(4)],
            ))
            .await
            .unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.contains_key("grade"));
        assert!(fields.contains_key("classes"));
    }

    #[tokio::test]
    async fn test_delete_grade_nulls_references() {
        let store = MemoryStore::new();
        let g = grade(&store, 1).await;
        let mut data = classroom("C-1");
        data.grade = Some(g.id);
        let c = store.create_classroom(data).await.unwrap();
        let s = store
            .create_student(student("Ana", "1", Some(g.id), vec![c.id]))
            .await
            .unwrap();

        store.delete_grade(g.id).await.unwrap();

        let s = store.get_student(s.id()).await.unwrap().unwrap();
        assert_eq!(s.grade, None);
        assert_eq!(s.classes, vec![c.id]);
        let c = store.get_classroom(c.id).await.unwrap().unwrap();
        assert_eq!(c.grade, None);
    }

    #[tokio::test]
    async fn test_delete_classroom_removes_associations() {
        let store = MemoryStore::new();
        let c1 = store.create_classroom(classroom("C-1")).await.unwrap();
        let c2 = store.create_classroom(classroom("C-2")).await.unwrap();
        let s = store
            .create_student(student("Ana", "1", None, vec![c1.id, c2.id]))
            .await
            .unwrap();

        store.delete_classroom(c1.id).await.unwrap();

        let s = store.get_student(s.id()).await.unwrap().unwrap();
        assert_eq!(s.classes, vec![c2.id]);
    }

    #[tokio::test]
    async fn test_duplicate_classroom_identifier() {
        let store = MemoryStore::new();
        store.create_classroom(classroom("C-1")).await.unwrap();
        let err = store.create_classroom(classroom("C-1")).await.unwrap_err();
        assert!(err.fields.unwrap().contains_key("identifier"));
        assert_eq!(store.list_classrooms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_register_date_and_id() {
        let store = MemoryStore::new();
        let created = store
            .create_student(student("Ana", "1", None, vec![]))
            .await
            .unwrap();
        let mut data = created.data();
        data.member.fullname = "Ana Clara".to_string();

        let updated = store.update_student(created.id(), data).await.unwrap();
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.member.register_date, created.member.register_date);
        assert_eq!(updated.member.firstname(), "Ana");
    }

    #[tokio::test]
    async fn test_update_missing_student_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_student(MemberId::new(42), student("Ana", "1", None, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn test_list_students_sorted_by_fullname() {
        let store = MemoryStore::new();
        for (name, doc) in [("Carla", "1"), ("Ana", "2"), ("Bia", "3")] {
            store
                .create_student(student(name, doc, None, vec![]))
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .list_students(&StudentQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.member.fullname)
            .collect();
        assert_eq!(names, vec!["Ana", "Bia", "Carla"]);
    }

    #[tokio::test]
    async fn test_users_unique_by_email() {
        let store = MemoryStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();
        assert!(store.create_user("a@example.com", "hash").await.is_err());
        let found = store.find_user_by_email("a@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(UserId::new(1)));
    }

    #[tokio::test]
    async fn test_clear_keeps_users() {
        let store = MemoryStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();
        grade(&store, 1).await;
        store.clear_school_data().await.unwrap();
        assert!(store.list_grades().await.unwrap().is_empty());
        assert!(
            store
                .find_user_by_email("a@example.com")
                .await
                .unwrap()
                .is_some()
        );
    }
}

//! PostgreSQL [`SchoolStore`] backed by an sqlx pool.
//!
//! Multi-table writes run inside a transaction. Uniqueness and foreign key
//! violations raised by the database are translated into the same field
//! errors the pre-write checks produce.

use async_trait::async_trait;
use classbook_config::DatabaseConfig;
use classbook_core::AppError;
use classbook_models::validation::today;
use classbook_models::{
    AcademicLevel, Classroom, ClassroomData, ClassroomId, Grade, GradeData, GradeId, Member,
    MemberData, MemberId, Student, StudentData, StudentQuery, Teacher, TeacherData, TeacherQuery,
    User,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{info, instrument};

use crate::checks::{EMAIL_TAKEN, ID_DOC_TAKEN, IDENTIFIER_TAKEN};
use crate::store::SchoolStore;

/// Connects a pool to `DATABASE_URL`.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| AppError::internal(anyhow::anyhow!("DATABASE_URL must be set")))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(AppError::database)?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(AppError::database)?;
    Ok(())
}

const GRADE_COLUMNS: &str = "id, name, rank";

const CLASSROOM_COLUMNS: &str = r#"id, name, identifier, room, days_of_week, "time", grade_id"#;

const STUDENT_SELECT: &str = r#"SELECT
        m.id, m.fullname, m.id_doc, m.birthdate, m.sex, m.monthly_payment, m.active,
        m.register_date, m.departure_date, m.email, m.phone_number, m.address,
        s.grade_id, s.guardian1, s.guardian2,
        ARRAY(
            SELECT sc.classroom_id FROM student_classes sc
            WHERE sc.student_id = m.id ORDER BY sc.classroom_id
        ) AS classes
    FROM members m
    JOIN students s ON s.member_id = m.id"#;

const TEACHER_SELECT: &str = r#"SELECT
        m.id, m.fullname, m.id_doc, m.birthdate, m.sex, m.monthly_payment, m.active,
        m.register_date, m.departure_date, m.email, m.phone_number, m.address,
        t.academic_level, t.bank_agency, t.bank_account,
        ARRAY(
            SELECT tc.classroom_id FROM teacher_classes tc
            WHERE tc.teacher_id = m.id ORDER BY tc.classroom_id
        ) AS classes
    FROM members m
    JOIN teachers t ON t.member_id = m.id"#;

#[derive(FromRow)]
struct StudentRow {
    #[sqlx(flatten)]
    member: Member,
    grade_id: Option<GradeId>,
    guardian1: String,
    guardian2: String,
    classes: Vec<ClassroomId>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            member: row.member,
            grade: row.grade_id,
            guardian1: row.guardian1,
            guardian2: row.guardian2,
            classes: row.classes,
        }
    }
}

#[derive(FromRow)]
struct TeacherRow {
    #[sqlx(flatten)]
    member: Member,
    academic_level: AcademicLevel,
    bank_agency: i64,
    bank_account: i64,
    classes: Vec<ClassroomId>,
}

impl From<TeacherRow> for Teacher {
    fn from(row: TeacherRow) -> Self {
        Self {
            member: row.member,
            academic_level: row.academic_level,
            bank_agency: row.bank_agency,
            bank_account: row.bank_account,
            classes: row.classes,
        }
    }
}

/// Association table between a Member kind and Classrooms.
#[derive(Clone, Copy)]
struct ClassLink {
    table: &'static str,
    owner_column: &'static str,
}

const STUDENT_CLASSES: ClassLink = ClassLink {
    table: "student_classes",
    owner_column: "student_id",
};

const TEACHER_CLASSES: ClassLink = ClassLink {
    table: "teacher_classes",
    owner_column: "teacher_id",
};

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            match constraint {
                "members_id_doc_key" => return AppError::invalid_field("id_doc", ID_DOC_TAKEN),
                "classrooms_identifier_key" => {
                    return AppError::invalid_field("identifier", IDENTIFIER_TAKEN);
                }
                "users_email_key" => return AppError::invalid_field("email", EMAIL_TAKEN),
                _ => {}
            }
        }
        if db_err.is_foreign_key_violation() {
            match constraint {
                "students_grade_id_fkey" | "classrooms_grade_id_fkey" => {
                    return AppError::invalid_field("grade", "Referenced grade does not exist.");
                }
                "student_classes_classroom_id_fkey" | "teacher_classes_classroom_id_fkey" => {
                    return AppError::invalid_field(
                        "classes",
                        "Referenced classroom does not exist.",
                    );
                }
                _ => {}
            }
        }
    }
    AppError::database(e)
}

fn not_found(entity: &str) -> AppError {
    AppError::not_found(anyhow::anyhow!("{} not found", entity))
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_member(
        tx: &mut Transaction<'_, Postgres>,
        kind: &str,
        data: &MemberData,
    ) -> Result<MemberId, AppError> {
        sqlx::query_scalar::<_, MemberId>(
            r#"INSERT INTO members
                (kind, fullname, id_doc, birthdate, sex, monthly_payment, active,
                 register_date, departure_date, email, phone_number, address)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING id"#,
        )
        .bind(kind)
        .bind(&data.fullname)
        .bind(&data.id_doc)
        .bind(data.birthdate)
        .bind(data.sex)
        .bind(data.monthly_payment)
        .bind(data.active)
        .bind(today())
        .bind(data.departure_date)
        .bind(&data.email)
        .bind(&data.phone_number)
        .bind(&data.address)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_write_error)
    }

    /// Returns `false` when no Member of that kind has the id.
    async fn update_member(
        tx: &mut Transaction<'_, Postgres>,
        kind: &str,
        id: MemberId,
        data: &MemberData,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"UPDATE members SET
                fullname = $3, id_doc = $4, birthdate = $5, sex = $6, monthly_payment = $7,
                active = $8, departure_date = $9, email = $10, phone_number = $11,
                address = $12
               WHERE id = $1 AND kind = $2"#,
        )
        .bind(id)
        .bind(kind)
        .bind(&data.fullname)
        .bind(&data.id_doc)
        .bind(data.birthdate)
        .bind(data.sex)
        .bind(data.monthly_payment)
        .bind(data.active)
        .bind(data.departure_date)
        .bind(&data.email)
        .bind(&data.phone_number)
        .bind(&data.address)
        .execute(&mut **tx)
        .await
        .map_err(map_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_classes(
        tx: &mut Transaction<'_, Postgres>,
        link: ClassLink,
        owner: MemberId,
        classes: &[ClassroomId],
    ) -> Result<(), AppError> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1",
            link.table, link.owner_column
        ))
        .bind(owner)
        .execute(&mut **tx)
        .await?;

        if classes.is_empty() {
            return Ok(());
        }

        sqlx::query(&format!(
            "INSERT INTO {} ({}, classroom_id) SELECT $1, UNNEST($2::BIGINT[])",
            link.table, link.owner_column
        ))
        .bind(owner)
        .bind(classes.to_vec())
        .execute(&mut **tx)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }
}

#[async_trait]
impl SchoolStore for PgStore {
    #[instrument(skip(self))]
    async fn list_grades(&self) -> Result<Vec<Grade>, AppError> {
        let grades = sqlx::query_as::<_, Grade>(&format!(
            "SELECT {} FROM grades ORDER BY rank, id",
            GRADE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(grades)
    }

    #[instrument(skip(self))]
    async fn get_grade(&self, id: GradeId) -> Result<Option<Grade>, AppError> {
        let grade = sqlx::query_as::<_, Grade>(&format!(
            "SELECT {} FROM grades WHERE id = $1",
            GRADE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(grade)
    }

    #[instrument(skip(self))]
    async fn create_grade(&self, data: GradeData) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!(
            "INSERT INTO grades (name, rank) VALUES ($1, $2) RETURNING {}",
            GRADE_COLUMNS
        ))
        .bind(&data.name)
        .bind(data.rank)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    #[instrument(skip(self))]
    async fn update_grade(&self, id: GradeId, data: GradeData) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!(
            "UPDATE grades SET name = $2, rank = $3 WHERE id = $1 RETURNING {}",
            GRADE_COLUMNS
        ))
        .bind(id)
        .bind(&data.name)
        .bind(data.rank)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| not_found("Grade"))
    }

    #[instrument(skip(self))]
    async fn delete_grade(&self, id: GradeId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Grade"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_classrooms(&self) -> Result<Vec<Classroom>, AppError> {
        let classrooms = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {} FROM classrooms ORDER BY identifier",
            CLASSROOM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(classrooms)
    }

    #[instrument(skip(self))]
    async fn get_classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, AppError> {
        let classroom = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {} FROM classrooms WHERE id = $1",
            CLASSROOM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(classroom)
    }

    #[instrument(skip(self))]
    async fn classrooms_by_ids(&self, ids: &[ClassroomId]) -> Result<Vec<Classroom>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let classrooms = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {} FROM classrooms WHERE id = ANY($1) ORDER BY identifier",
            CLASSROOM_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(classrooms)
    }

    #[instrument(skip(self))]
    async fn create_classroom(&self, data: ClassroomData) -> Result<Classroom, AppError> {
        sqlx::query_as::<_, Classroom>(&format!(
            r#"INSERT INTO classrooms (name, identifier, room, days_of_week, "time", grade_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            CLASSROOM_COLUMNS
        ))
        .bind(&data.name)
        .bind(&data.identifier)
        .bind(&data.room)
        .bind(&data.days_of_week)
        .bind(data.time)
        .bind(data.grade)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    #[instrument(skip(self))]
    async fn update_classroom(
        &self,
        id: ClassroomId,
        data: ClassroomData,
    ) -> Result<Classroom, AppError> {
        sqlx::query_as::<_, Classroom>(&format!(
            r#"UPDATE classrooms SET
                name = $2, identifier = $3, room = $4, days_of_week = $5, "time" = $6,
                grade_id = $7
               WHERE id = $1
               RETURNING {}"#,
            CLASSROOM_COLUMNS
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.identifier)
        .bind(&data.room)
        .bind(&data.days_of_week)
        .bind(data.time)
        .bind(data.grade)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| not_found("Classroom"))
    }

    #[instrument(skip(self))]
    async fn delete_classroom(&self, id: ClassroomId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classrooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("Classroom"));
        }
        Ok(())
    }

    async fn classroom_identifier_taken(
        &self,
        identifier: &str,
        except: Option<ClassroomId>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                SELECT 1 FROM classrooms
                WHERE identifier = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )"#,
        )
        .bind(identifier)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn id_doc_taken(
        &self,
        id_doc: &str,
        except: Option<MemberId>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                SELECT 1 FROM members
                WHERE id_doc = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )"#,
        )
        .bind(id_doc)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    #[instrument(skip(self))]
    async fn list_students(&self, query: &StudentQuery) -> Result<Vec<Student>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(STUDENT_SELECT);
        builder.push(" WHERE TRUE");

        if query.active_only {
            builder.push(" AND m.active");
        }
        if let Some(grades) = &query.grades {
            builder
                .push(" AND s.grade_id = ANY(")
                .push_bind(grades.clone())
                .push(")");
        }
        if let Some(classes) = &query.classes {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM student_classes f \
                     WHERE f.student_id = m.id AND f.classroom_id = ANY(",
                )
                .push_bind(classes.clone())
                .push("))");
        }
        builder.push(" ORDER BY m.fullname, m.id");

        let rows = builder
            .build_query_as::<StudentRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_student(&self, id: MemberId) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!("{} WHERE m.id = $1", STUDENT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Student::from))
    }

    #[instrument(skip(self, data))]
    async fn create_student(&self, data: StudentData) -> Result<Student, AppError> {
        let mut tx = self.pool.begin().await?;

        let id = Self::insert_member(&mut tx, "student", &data.member).await?;
        sqlx::query(
            "INSERT INTO students (member_id, grade_id, guardian1, guardian2) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(data.grade)
        .bind(&data.guardian1)
        .bind(&data.guardian2)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
        Self::replace_classes(&mut tx, STUDENT_CLASSES, id, &data.classes).await?;

        tx.commit().await?;

        self.get_student(id)
            .await?
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Student {} missing after insert", id)))
    }

    #[instrument(skip(self, data))]
    async fn update_student(&self, id: MemberId, data: StudentData) -> Result<Student, AppError> {
        let mut tx = self.pool.begin().await?;

        if !Self::update_member(&mut tx, "student", id, &data.member).await? {
            return Err(not_found("Student"));
        }
        sqlx::query(
            "UPDATE students SET grade_id = $2, guardian1 = $3, guardian2 = $4 WHERE member_id = $1",
        )
        .bind(id)
        .bind(data.grade)
        .bind(&data.guardian1)
        .bind(&data.guardian2)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
        Self::replace_classes(&mut tx, STUDENT_CLASSES, id, &data.classes).await?;

        tx.commit().await?;

        self.get_student(id).await?.ok_or_else(|| not_found("Student"))
    }

    #[instrument(skip(self))]
    async fn list_teachers(&self, query: &TeacherQuery) -> Result<Vec<Teacher>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(TEACHER_SELECT);
        builder.push(" WHERE TRUE");

        if query.active_only {
            builder.push(" AND m.active");
        }
        if let Some(levels) = &query.academic_levels {
            builder
                .push(" AND t.academic_level = ANY(")
                .push_bind(levels.clone())
                .push(")");
        }
        if let Some(classes) = &query.classes {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM teacher_classes f \
                     WHERE f.teacher_id = m.id AND f.classroom_id = ANY(",
                )
                .push_bind(classes.clone())
                .push("))");
        }
        builder.push(" ORDER BY m.fullname, m.id");

        let rows = builder
            .build_query_as::<TeacherRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Teacher::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_teacher(&self, id: MemberId) -> Result<Option<Teacher>, AppError> {
        let row = sqlx::query_as::<_, TeacherRow>(&format!("{} WHERE m.id = $1", TEACHER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Teacher::from))
    }

    #[instrument(skip(self, data))]
    async fn create_teacher(&self, data: TeacherData) -> Result<Teacher, AppError> {
        let mut tx = self.pool.begin().await?;

        let id = Self::insert_member(&mut tx, "teacher", &data.member).await?;
        sqlx::query(
            r#"INSERT INTO teachers (member_id, academic_level, bank_agency, bank_account)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(id)
        .bind(data.academic_level)
        .bind(data.bank_agency)
        .bind(data.bank_account)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
        Self::replace_classes(&mut tx, TEACHER_CLASSES, id, &data.classes).await?;

        tx.commit().await?;

        self.get_teacher(id)
            .await?
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Teacher {} missing after insert", id)))
    }

    #[instrument(skip(self, password_hash))]
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (email, password_hash) VALUES ($1, $2)
               RETURNING id, email, password_hash, created_at"#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn clear_school_data(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        // Students, Teachers and associations cascade from these.
        sqlx::query("DELETE FROM members").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM classrooms").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM grades").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

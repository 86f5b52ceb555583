use utoipa::openapi::security::{ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, RefreshRequest, RegisterRequestDto, TokenPairResponse,
};
use crate::modules::calendar::model::{
    AddAttendeeDto, CalendarEvent, CreateEventDto, EventAttendee, EventFilterParams,
    PaginatedEventsResponse, RsvpDto, UpdateEventDto,
};
use crate::modules::classes::model::{
    Class, ClassFilterParams, CreateClassDto, CreateSubjectDto, PaginatedClassesResponse, Subject,
    SubjectFilterParams, UpdateClassDto, UpdateSubjectDto,
};
use crate::modules::email::model::{
    CreateTemplateDto, EmailNotification, EmailTemplate, NotificationFilterParams,
    PaginatedNotificationsResponse, SendEmailDto, TemplateFilterParams, UpdateTemplateDto,
};
use crate::modules::examinations::model::{
    CreateExamSubjectDto, CreateExaminationDto, CreateGradeDto, CreateGradingScaleDto, Examination,
    ExaminationFilterParams, ExaminationSubject, Grade, GradingScale,
    PaginatedExaminationsResponse, UpdateExaminationDto, UpdateGradeDto, UpdateGradingScaleDto,
};
use crate::modules::fees::model::{
    CreateFeeCategoryDto, CreateFeeDueDateDto, CreateFeeStructureDto, CreateFeeTransactionDto,
    FeeCategory, FeeCategoryFilterParams, FeeDueDate, FeeStructure, FeeStructureFilterParams,
    FeeTransaction, FeeTransactionFilterParams, PaginatedFeeStructuresResponse,
    PaginatedFeeTransactionsResponse, UpdateFeeCategoryDto, UpdateFeeStructureDto,
};
use crate::modules::integrations::model::{
    ApiKey, ApplicationFilterParams, CreateApiKeyDto, CreateApplicationDto, CreatedApiKeyResponse,
    ExternalApplication, PaginatedApplicationsResponse, UpdateApplicationDto,
};
use crate::modules::library::model::{
    Book, BookCategory, BookFilterParams, BookIssue, CreateBookDto, CreateCategoryDto,
    CreateIssueDto, IssueFilterParams, LibrarySettings, PaginatedBooksResponse,
    PaginatedIssuesResponse, UpdateBookDto, UpdateCategoryDto, UpdateIssueDto, UpdateSettingsDto,
};
use crate::modules::messages::model::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto, InboxFilterParams, InboxMessage,
    Message, MessageRecipient, PaginatedInboxResponse, PaginatedMessagesResponse, SendMessageDto,
    UpdateAnnouncementDto,
};
use crate::modules::staff::model::{
    CreateStaffDto, PaginatedStaffResponse, Staff, StaffFilterParams, UpdateStaffDto,
};
use crate::modules::students::model::{
    CreateParentDto, CreateReportDto, CreateStudentDto, PaginatedStudentsResponse, ParentGuardian,
    PerformanceReport, Student, StudentFilterParams, UpdateParentDto, UpdateReportDto,
    UpdateStudentDto,
};
use crate::modules::timetable::model::{
    CreateEntryDto, CreatePeriodDto, CreateTimetableDto, EntryFilterParams,
    PaginatedTimetablesResponse, Period, PeriodFilterParams, Timetable, TimetableEntry,
    TimetableFilterParams, UpdatePeriodDto, UpdateTimetableDto,
};
use crate::modules::users::model::{
    PaginatedUsersResponse, Role, UpdateUserDto, User, UserFilterParams, UserWithRoles,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_tokens,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_roles,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::assign_role,
        crate::modules::users::controller::remove_role,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_my_student,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::create_parent,
        crate::modules::students::controller::get_parent,
        crate::modules::students::controller::update_parent,
        crate::modules::students::controller::get_student_parents,
        crate::modules::students::controller::link_parent,
        crate::modules::students::controller::unlink_parent,
        crate::modules::students::controller::get_student_reports,
        crate::modules::students::controller::create_report,
        crate::modules::students::controller::update_report,
        crate::modules::students::controller::publish_report,
        crate::modules::students::controller::get_my_reports,
        crate::modules::staff::controller::get_staff_members,
        crate::modules::staff::controller::create_staff,
        crate::modules::staff::controller::get_my_staff,
        crate::modules::staff::controller::get_staff,
        crate::modules::staff::controller::update_staff,
        crate::modules::staff::controller::delete_staff,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::get_subjects,
        crate::modules::classes::controller::create_subject,
        crate::modules::classes::controller::get_subject,
        crate::modules::classes::controller::update_subject,
        crate::modules::classes::controller::delete_subject,
        crate::modules::examinations::controller::get_examinations,
        crate::modules::examinations::controller::create_examination,
        crate::modules::examinations::controller::get_examination,
        crate::modules::examinations::controller::update_examination,
        crate::modules::examinations::controller::delete_examination,
        crate::modules::examinations::controller::add_exam_subject,
        crate::modules::examinations::controller::get_exam_subjects,
        crate::modules::examinations::controller::create_grade,
        crate::modules::examinations::controller::get_exam_subject_grades,
        crate::modules::examinations::controller::get_my_grades,
        crate::modules::examinations::controller::get_grade,
        crate::modules::examinations::controller::update_grade,
        crate::modules::examinations::controller::get_grading_scales,
        crate::modules::examinations::controller::create_grading_scale,
        crate::modules::examinations::controller::update_grading_scale,
        crate::modules::examinations::controller::delete_grading_scale,
        crate::modules::library::controller::get_categories,
        crate::modules::library::controller::create_category,
        crate::modules::library::controller::update_category,
        crate::modules::library::controller::delete_category,
        crate::modules::library::controller::get_books,
        crate::modules::library::controller::create_book,
        crate::modules::library::controller::get_book,
        crate::modules::library::controller::update_book,
        crate::modules::library::controller::delete_book,
        crate::modules::library::controller::get_issues,
        crate::modules::library::controller::create_issue,
        crate::modules::library::controller::get_issue,
        crate::modules::library::controller::return_issue,
        crate::modules::library::controller::update_issue,
        crate::modules::library::controller::get_settings,
        crate::modules::library::controller::update_settings,
        crate::modules::calendar::controller::get_events,
        crate::modules::calendar::controller::create_event,
        crate::modules::calendar::controller::get_event,
        crate::modules::calendar::controller::update_event,
        crate::modules::calendar::controller::delete_event,
        crate::modules::calendar::controller::get_event_attendees,
        crate::modules::calendar::controller::add_attendee,
        crate::modules::calendar::controller::set_my_rsvp,
        crate::modules::calendar::controller::remove_attendee,
        crate::modules::email::controller::get_templates,
        crate::modules::email::controller::create_template,
        crate::modules::email::controller::get_template,
        crate::modules::email::controller::update_template,
        crate::modules::email::controller::delete_template,
        crate::modules::email::controller::send_email,
        crate::modules::email::controller::get_notifications,
        crate::modules::email::controller::get_notification,
        crate::modules::email::controller::delete_notification,
        crate::modules::fees::controller::get_categories,
        crate::modules::fees::controller::create_category,
        crate::modules::fees::controller::update_category,
        crate::modules::fees::controller::get_structures,
        crate::modules::fees::controller::create_structure,
        crate::modules::fees::controller::get_structure,
        crate::modules::fees::controller::update_structure,
        crate::modules::fees::controller::delete_structure,
        crate::modules::fees::controller::create_due_date,
        crate::modules::fees::controller::get_due_dates,
        crate::modules::fees::controller::get_transactions,
        crate::modules::fees::controller::create_transaction,
        crate::modules::fees::controller::get_my_transactions,
        crate::modules::fees::controller::get_transaction,
        crate::modules::timetable::controller::get_periods,
        crate::modules::timetable::controller::create_period,
        crate::modules::timetable::controller::update_period,
        crate::modules::timetable::controller::get_timetables,
        crate::modules::timetable::controller::create_timetable,
        crate::modules::timetable::controller::get_timetable,
        crate::modules::timetable::controller::update_timetable,
        crate::modules::timetable::controller::delete_timetable,
        crate::modules::timetable::controller::get_entries,
        crate::modules::timetable::controller::create_entry,
        crate::modules::timetable::controller::delete_entry,
        crate::modules::messages::controller::send_message,
        crate::modules::messages::controller::get_inbox,
        crate::modules::messages::controller::get_sent,
        crate::modules::messages::controller::get_message,
        crate::modules::messages::controller::mark_read,
        crate::modules::messages::controller::archive_message,
        crate::modules::messages::controller::get_announcements,
        crate::modules::messages::controller::create_announcement,
        crate::modules::messages::controller::update_announcement,
        crate::modules::messages::controller::delete_announcement,
        crate::modules::integrations::controller::get_applications,
        crate::modules::integrations::controller::create_application,
        crate::modules::integrations::controller::get_application,
        crate::modules::integrations::controller::update_application,
        crate::modules::integrations::controller::delete_application,
        crate::modules::integrations::controller::create_key,
        crate::modules::integrations::controller::get_keys,
        crate::modules::integrations::controller::revoke_key,
        crate::modules::integrations::controller::whoami,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
            RegisterRequestDto,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            TokenPairResponse,
            User,
            UserWithRoles,
            Role,
            UpdateUserDto,
            UserFilterParams,
            PaginatedUsersResponse,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            StudentFilterParams,
            PaginatedStudentsResponse,
            ParentGuardian,
            CreateParentDto,
            UpdateParentDto,
            PerformanceReport,
            CreateReportDto,
            UpdateReportDto,
            Staff,
            CreateStaffDto,
            UpdateStaffDto,
            StaffFilterParams,
            PaginatedStaffResponse,
            Class,
            CreateClassDto,
            UpdateClassDto,
            ClassFilterParams,
            PaginatedClassesResponse,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            SubjectFilterParams,
            Examination,
            CreateExaminationDto,
            UpdateExaminationDto,
            ExaminationFilterParams,
            PaginatedExaminationsResponse,
            ExaminationSubject,
            CreateExamSubjectDto,
            Grade,
            CreateGradeDto,
            UpdateGradeDto,
            GradingScale,
            CreateGradingScaleDto,
            UpdateGradingScaleDto,
            BookCategory,
            CreateCategoryDto,
            UpdateCategoryDto,
            Book,
            CreateBookDto,
            UpdateBookDto,
            BookFilterParams,
            PaginatedBooksResponse,
            BookIssue,
            CreateIssueDto,
            UpdateIssueDto,
            IssueFilterParams,
            PaginatedIssuesResponse,
            LibrarySettings,
            UpdateSettingsDto,
            CalendarEvent,
            CreateEventDto,
            UpdateEventDto,
            EventFilterParams,
            PaginatedEventsResponse,
            EventAttendee,
            AddAttendeeDto,
            RsvpDto,
            EmailTemplate,
            CreateTemplateDto,
            UpdateTemplateDto,
            TemplateFilterParams,
            EmailNotification,
            SendEmailDto,
            NotificationFilterParams,
            PaginatedNotificationsResponse,
            FeeCategory,
            CreateFeeCategoryDto,
            UpdateFeeCategoryDto,
            FeeCategoryFilterParams,
            FeeStructure,
            CreateFeeStructureDto,
            UpdateFeeStructureDto,
            FeeStructureFilterParams,
            PaginatedFeeStructuresResponse,
            FeeDueDate,
            CreateFeeDueDateDto,
            FeeTransaction,
            CreateFeeTransactionDto,
            FeeTransactionFilterParams,
            PaginatedFeeTransactionsResponse,
            Period,
            CreatePeriodDto,
            UpdatePeriodDto,
            PeriodFilterParams,
            Timetable,
            CreateTimetableDto,
            UpdateTimetableDto,
            TimetableFilterParams,
            PaginatedTimetablesResponse,
            TimetableEntry,
            CreateEntryDto,
            EntryFilterParams,
            Message,
            MessageRecipient,
            InboxMessage,
            SendMessageDto,
            InboxFilterParams,
            PaginatedInboxResponse,
            PaginatedMessagesResponse,
            Announcement,
            CreateAnnouncementDto,
            UpdateAnnouncementDto,
            AnnouncementFilterParams,
            ExternalApplication,
            CreateApplicationDto,
            UpdateApplicationDto,
            ApplicationFilterParams,
            PaginatedApplicationsResponse,
            ApiKey,
            CreateApiKeyDto,
            CreatedApiKeyResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Users", description = "User and role administration"),
        (name = "Students", description = "Student records, parents and performance reports"),
        (name = "Staff", description = "Staff records"),
        (name = "Classes", description = "Classes and subjects"),
        (name = "Examinations", description = "Examinations, grades and grading scales"),
        (name = "Library", description = "Book catalogue and lending"),
        (name = "Calendar", description = "School events and attendees"),
        (name = "Email", description = "Email templates and outbound notifications"),
        (name = "Fees", description = "Fee categories, structures and transactions"),
        (name = "Timetable", description = "Periods, timetables and entries"),
        (name = "Messages", description = "Direct messages and announcements"),
        (name = "Integrations", description = "External applications and API keys")
    ),
    info(
        title = "Slateworks API",
        version = "0.1.0",
        description = "A school management REST API built with Rust, Axum, and PostgreSQL featuring JWT-based authentication and role-based access control.",
        contact(
            name = "API Support",
            email = "support@slateworks.dev"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(utoipa::openapi::security::ApiKey::Header(
                    ApiKeyValue::new("X-API-Key"),
                )),
            );
        }
    }
}

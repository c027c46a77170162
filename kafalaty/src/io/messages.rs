//! Localized user-facing messages.
//!
//! Arabic is the default locale. Technical detail never goes into these
//! strings; it is logged on the diagnostic channel instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{
    AuthError, CascadePhase, Field, KafalatyError, PartialFailure, Rule, StoreError, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ar" | "arabic" => Ok(Locale::Arabic),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// User-level operations that report an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Logout,
    LoadProfile,
    CreateChild,
    LoadChildren,
    DeleteChild,
    CreateKafala,
    LoadKafalas,
    DeleteKafala,
    ReplaceKafala,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    fn pick(&self, arabic: &'static str, english: &'static str) -> &'static str {
        match self.locale {
            Locale::Arabic => arabic,
            Locale::English => english,
        }
    }

    pub fn success_title(&self) -> &'static str {
        self.pick("تم بنجاح", "Success")
    }

    pub fn error_title(&self) -> &'static str {
        self.pick("خطأ", "Error")
    }

    pub fn warning_title(&self) -> &'static str {
        self.pick("تنبيه", "Warning")
    }

    pub fn busy(&self, operation: Operation) -> &'static str {
        match operation {
            Operation::Register => self.pick("جاري إنشاء الحساب...", "Creating account..."),
            Operation::Login => self.pick("جاري تسجيل الدخول...", "Signing in..."),
            Operation::Logout => self.pick("جاري تسجيل الخروج...", "Signing out..."),
            Operation::CreateChild => self.pick("جاري إضافة الطفل...", "Adding child..."),
            Operation::DeleteChild => self.pick("جاري حذف الطفل...", "Deleting child..."),
            Operation::CreateKafala => self.pick("جاري إضافة الكفالة...", "Adding kafala..."),
            Operation::DeleteKafala => self.pick("جاري حذف الكفالة...", "Deleting kafala..."),
            Operation::ReplaceKafala => self.pick("جاري تعديل الكفالة...", "Updating kafala..."),
            Operation::LoadProfile | Operation::LoadChildren | Operation::LoadKafalas => {
                self.pick("جاري التحميل...", "Loading...")
            }
        }
    }

    /// Success message. Reads report failures only and have none.
    pub fn success(&self, operation: Operation) -> Option<&'static str> {
        let message = match operation {
            Operation::Register => self.pick(
                "تم إنشاء الحساب، جاري تسجيل الدخول...",
                "Account created, signing in...",
            ),
            Operation::Login => self.pick("تم تسجيل الدخول", "Signed in"),
            Operation::Logout => self.pick("تم تسجيل الخروج", "Signed out"),
            Operation::CreateChild => self.pick("تمت إضافة الطفل", "Child added"),
            Operation::DeleteChild => {
                self.pick("تم حذف الطفل وجميع كفالاته", "Child and all of its kafalas deleted")
            }
            Operation::CreateKafala => self.pick("تمت إضافة الكفالة", "Kafala added"),
            Operation::DeleteKafala => self.pick("تم حذف الكفالة", "Kafala deleted"),
            Operation::ReplaceKafala => self.pick("تم تعديل الكفالة", "Kafala updated"),
            Operation::LoadProfile | Operation::LoadChildren | Operation::LoadKafalas => return None,
        };
        Some(message)
    }

    pub fn validation(&self, error: &ValidationError) -> String {
        let message = match (error.field, error.rule) {
            (Field::Identifier | Field::Name | Field::Password, Rule::Required) => {
                self.pick("الرجاء ملء جميع الحقول", "Please fill in all fields")
            }
            (Field::Password, Rule::Mismatch) => {
                self.pick("كلمتا المرور غير متطابقتين", "Passwords do not match")
            }
            (Field::Password, Rule::TooShort { min }) => {
                return match self.locale {
                    Locale::Arabic => format!("كلمة المرور يجب أن تكون {} أحرف على الأقل", min),
                    Locale::English => format!("Password must be at least {} characters", min),
                };
            }
            (Field::Age, Rule::Required) => self.pick("عمر الطفل مطلوب", "Child age is required"),
            (Field::Age, _) => self.pick(
                "العمر يجب أن يكون رقماً صحيحاً غير سالب",
                "Age must be a whole number of zero or more",
            ),
            (Field::Organization, _) => {
                self.pick("اسم الجهة الكافلة مطلوب", "Organization is required")
            }
            (Field::Amount, Rule::Required) => self.pick("المبلغ مطلوب", "Amount is required"),
            (Field::Amount, Rule::TooLarge) => self.pick("المبلغ كبير جداً", "Amount is too large"),
            (Field::Amount, Rule::TooPrecise) => {
                self.pick("المبلغ يحتوي على أرقام كثيرة", "Amount has too many digits")
            }
            (Field::Amount, _) => {
                self.pick("المبلغ يجب أن يكون رقماً موجباً", "Amount must be a positive number")
            }
            (Field::Date, Rule::Required) => self.pick("التاريخ مطلوب", "Date is required"),
            (Field::Date, _) => self.pick("التاريخ غير صالح", "Date is not valid"),
            (Field::Currency, _) => self.pick("العملة غير مدعومة", "Currency is not supported"),
            _ => self.pick("الرجاء التحقق من البيانات المدخلة", "Please check the entered data"),
        };
        message.to_string()
    }

    pub fn auth(&self, error: &AuthError) -> String {
        match error {
            AuthError::EmailTaken => self.pick("رقم الهوية مسجل مسبقاً", "This ID is already registered").to_string(),
            AuthError::WeakSecret => self
                .pick("كلمة المرور ضعيفة", "Password is too weak")
                .to_string(),
            AuthError::InvalidCredentials => self
                .pick("رقم الهوية أو كلمة المرور غير صحيحة", "Wrong ID or password")
                .to_string(),
            AuthError::Unauthenticated => self
                .pick("يجب تسجيل الدخول أولاً", "Please sign in first")
                .to_string(),
            AuthError::Provider { code, .. } => match self.locale {
                Locale::Arabic => format!("خطأ: {}", code),
                Locale::English => format!("Error: {}", code),
            },
        }
    }

    pub fn store(&self, error: &StoreError) -> &'static str {
        match error {
            StoreError::NotFound { .. } => self.pick("السجل غير موجود", "Record not found"),
            StoreError::PermissionDenied { .. } => {
                self.pick("مشكلة في الصلاحيات", "Permission problem")
            }
            StoreError::Transient { .. } => self.pick(
                "تعذر الاتصال بالخادم، حاول مرة أخرى",
                "Could not reach the server, try again",
            ),
            StoreError::Unknown { .. } => {
                self.pick("حدث خطأ، حاول مرة أخرى", "Something went wrong, try again")
            }
        }
    }

    pub fn partial_failure(&self, failure: &PartialFailure) -> &'static str {
        match failure.failed_phase {
            CascadePhase::Contributions => self.pick(
                "تم حذف بعض الكفالات فقط، أعد محاولة الحذف",
                "Only some kafalas were deleted, retry the delete",
            ),
            CascadePhase::Parent => self.pick(
                "تم حذف الكفالات ولكن لم يتم حذف الطفل، أعد محاولة الحذف",
                "Kafalas were deleted but the child was not, retry the delete",
            ),
        }
    }

    /// Message for any failure a service returns
    pub fn error(&self, error: &KafalatyError) -> String {
        match error {
            KafalatyError::Validation(e) => self.validation(e),
            KafalatyError::Auth(e) => self.auth(e),
            KafalatyError::Store(e) => self.store(e).to_string(),
            KafalatyError::PartialFailure(e) => self.partial_failure(e).to_string(),
        }
    }
}

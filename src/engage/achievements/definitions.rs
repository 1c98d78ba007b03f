//! Achievement definitions and metadata
//!
//! All achievements are defined here with their rewards and optional
//! progress targets. Unlock conditions live in the trigger table.

use serde::{Deserialize, Serialize, Serializer};

/// Unique identifier for each achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AchievementId {
    // Getting started
    FirstProduct,
    FirstBill,
    FirstCustomer,
    DarkMode,
    VoiceSearch,

    // Sales
    Sales10,
    Sales50,
    Sales100,
    Sales500,
    Revenue10k,
    Revenue100k,
    Revenue1m,
    VoiceBilling,

    // Inventory
    Products10,
    Products50,
    Products200,
    BulkImport,
    LowStockAlert,

    // Customers
    Customers10,
    Customers50,
    Customers100,
    LoyaltyProgram,

    // Power user
    AdminUnlocked,
    DataExport,
    ShortcutPro,
    Consistent7,
    FeatureExplorer,

    // Master
    ShopMaster,
    InventoryMaster,
    CommunityPillar,
}

impl AchievementId {
    /// Get the string ID used in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstProduct => "first-product",
            Self::FirstBill => "first-bill",
            Self::FirstCustomer => "first-customer",
            Self::DarkMode => "dark-mode",
            Self::VoiceSearch => "voice-search",
            Self::Sales10 => "sales-10",
            Self::Sales50 => "sales-50",
            Self::Sales100 => "sales-100",
            Self::Sales500 => "sales-500",
            Self::Revenue10k => "revenue-10k",
            Self::Revenue100k => "revenue-100k",
            Self::Revenue1m => "revenue-1m",
            Self::VoiceBilling => "voice-billing",
            Self::Products10 => "products-10",
            Self::Products50 => "products-50",
            Self::Products200 => "products-200",
            Self::BulkImport => "bulk-import",
            Self::LowStockAlert => "low-stock-alert",
            Self::Customers10 => "customers-10",
            Self::Customers50 => "customers-50",
            Self::Customers100 => "customers-100",
            Self::LoyaltyProgram => "loyalty-program",
            Self::AdminUnlocked => "admin-unlocked",
            Self::DataExport => "data-export",
            Self::ShortcutPro => "shortcut-pro",
            Self::Consistent7 => "consistent-7",
            Self::FeatureExplorer => "feature-explorer",
            Self::ShopMaster => "shop-master",
            Self::InventoryMaster => "inventory-master",
            Self::CommunityPillar => "community-pillar",
        }
    }

    /// Parse from a persisted string. Unknown ids yield `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }

    /// Get all achievement IDs in catalog order
    pub fn all() -> &'static [AchievementId] {
        &[
            Self::FirstProduct,
            Self::FirstBill,
            Self::FirstCustomer,
            Self::DarkMode,
            Self::VoiceSearch,
            Self::Sales10,
            Self::Sales50,
            Self::Sales100,
            Self::Sales500,
            Self::Revenue10k,
            Self::Revenue100k,
            Self::Revenue1m,
            Self::VoiceBilling,
            Self::Products10,
            Self::Products50,
            Self::Products200,
            Self::BulkImport,
            Self::LowStockAlert,
            Self::Customers10,
            Self::Customers50,
            Self::Customers100,
            Self::LoyaltyProgram,
            Self::AdminUnlocked,
            Self::DataExport,
            Self::ShortcutPro,
            Self::Consistent7,
            Self::FeatureExplorer,
            Self::ShopMaster,
            Self::InventoryMaster,
            Self::CommunityPillar,
        ]
    }
}

impl Serialize for AchievementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Achievement category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementCategory {
    GettingStarted,
    Sales,
    Inventory,
    Customers,
    PowerUser,
    Master,
}

impl AchievementCategory {
    pub fn all() -> &'static [AchievementCategory] {
        &[
            Self::GettingStarted,
            Self::Sales,
            Self::Inventory,
            Self::Customers,
            Self::PowerUser,
            Self::Master,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GettingStarted => "Getting Started",
            Self::Sales => "Sales",
            Self::Inventory => "Inventory",
            Self::Customers => "Customers",
            Self::PowerUser => "Power User",
            Self::Master => "Master",
        }
    }
}

/// Badge tier shown next to an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

/// Closed set of icons. The presentation layer maps these to drawables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconTag {
    Package,
    Receipt,
    UserPlus,
    Moon,
    Search,
    TrendingUp,
    Coins,
    Microphone,
    Boxes,
    Upload,
    Bell,
    Users,
    Heart,
    Shield,
    Download,
    Keyboard,
    Calendar,
    Compass,
    Crown,
    Trophy,
    Star,
}

/// Achievement definition with all metadata
#[derive(Debug, Clone)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: IconTag,
    pub points: u32,
    pub badge: Badge,
    pub category: AchievementCategory,
    /// For progressive achievements, the target count
    pub target: Option<u64>,
}

/// All achievement definitions
pub static ACHIEVEMENTS: &[Achievement] = &[
    // === GETTING STARTED ===
    Achievement {
        id: AchievementId::FirstProduct,
        title: "Stocked Up",
        description: "Add your first product",
        icon: IconTag::Package,
        points: 10,
        badge: Badge::Bronze,
        category: AchievementCategory::GettingStarted,
        target: Some(1),
    },
    Achievement {
        id: AchievementId::FirstBill,
        title: "First Sale",
        description: "Create your first bill",
        icon: IconTag::Receipt,
        points: 10,
        badge: Badge::Bronze,
        category: AchievementCategory::GettingStarted,
        target: Some(1),
    },
    Achievement {
        id: AchievementId::FirstCustomer,
        title: "Hello, Regular",
        description: "Add your first customer",
        icon: IconTag::UserPlus,
        points: 10,
        badge: Badge::Bronze,
        category: AchievementCategory::GettingStarted,
        target: Some(1),
    },
    Achievement {
        id: AchievementId::DarkMode,
        title: "Night Shift",
        description: "Switch on dark mode",
        icon: IconTag::Moon,
        points: 5,
        badge: Badge::Bronze,
        category: AchievementCategory::GettingStarted,
        target: None,
    },
    Achievement {
        id: AchievementId::VoiceSearch,
        title: "Ask Aloud",
        description: "Search the catalog by voice",
        icon: IconTag::Search,
        points: 15,
        badge: Badge::Bronze,
        category: AchievementCategory::GettingStarted,
        target: None,
    },
    // === SALES ===
    Achievement {
        id: AchievementId::Sales10,
        title: "Getting Busy",
        description: "Create 10 bills",
        icon: IconTag::TrendingUp,
        points: 50,
        badge: Badge::Silver,
        category: AchievementCategory::Sales,
        target: Some(10),
    },
    Achievement {
        id: AchievementId::Sales50,
        title: "Steady Counter",
        description: "Create 50 bills",
        icon: IconTag::TrendingUp,
        points: 100,
        badge: Badge::Silver,
        category: AchievementCategory::Sales,
        target: Some(50),
    },
    Achievement {
        id: AchievementId::Sales100,
        title: "Century of Sales",
        description: "Create 100 bills",
        icon: IconTag::TrendingUp,
        points: 150,
        badge: Badge::Gold,
        category: AchievementCategory::Sales,
        target: Some(100),
    },
    Achievement {
        id: AchievementId::Sales500,
        title: "Rush Hour",
        description: "Create 500 bills",
        icon: IconTag::TrendingUp,
        points: 300,
        badge: Badge::Platinum,
        category: AchievementCategory::Sales,
        target: Some(500),
    },
    Achievement {
        id: AchievementId::Revenue10k,
        title: "Ten Thousand",
        description: "Reach 10,000 in total revenue",
        icon: IconTag::Coins,
        points: 75,
        badge: Badge::Silver,
        category: AchievementCategory::Sales,
        target: Some(10_000),
    },
    Achievement {
        id: AchievementId::Revenue100k,
        title: "Lakhpati",
        description: "Reach 1,00,000 in total revenue",
        icon: IconTag::Coins,
        points: 200,
        badge: Badge::Gold,
        category: AchievementCategory::Sales,
        target: Some(100_000),
    },
    Achievement {
        id: AchievementId::Revenue1m,
        title: "Ten Lakh Club",
        description: "Reach 10,00,000 in total revenue",
        icon: IconTag::Coins,
        points: 500,
        badge: Badge::Diamond,
        category: AchievementCategory::Sales,
        target: Some(1_000_000),
    },
    Achievement {
        id: AchievementId::VoiceBilling,
        title: "Talk to Bill",
        description: "Create a bill using voice input",
        icon: IconTag::Microphone,
        points: 25,
        badge: Badge::Bronze,
        category: AchievementCategory::Sales,
        target: None,
    },
    // === INVENTORY ===
    Achievement {
        id: AchievementId::Products10,
        title: "Shelf Filler",
        description: "Add 10 products",
        icon: IconTag::Boxes,
        points: 25,
        badge: Badge::Bronze,
        category: AchievementCategory::Inventory,
        target: Some(10),
    },
    Achievement {
        id: AchievementId::Products50,
        title: "Well Stocked",
        description: "Add 50 products",
        icon: IconTag::Boxes,
        points: 75,
        badge: Badge::Silver,
        category: AchievementCategory::Inventory,
        target: Some(50),
    },
    Achievement {
        id: AchievementId::Products200,
        title: "Warehouse",
        description: "Add 200 products",
        icon: IconTag::Boxes,
        points: 150,
        badge: Badge::Gold,
        category: AchievementCategory::Inventory,
        target: Some(200),
    },
    Achievement {
        id: AchievementId::BulkImport,
        title: "Bulk Loader",
        description: "Import products in bulk",
        icon: IconTag::Upload,
        points: 30,
        badge: Badge::Silver,
        category: AchievementCategory::Inventory,
        target: None,
    },
    Achievement {
        id: AchievementId::LowStockAlert,
        title: "Watchful Eye",
        description: "Set a low-stock alert",
        icon: IconTag::Bell,
        points: 20,
        badge: Badge::Bronze,
        category: AchievementCategory::Inventory,
        target: None,
    },
    // === CUSTOMERS ===
    Achievement {
        id: AchievementId::Customers10,
        title: "Known Faces",
        description: "Add 10 customers",
        icon: IconTag::Users,
        points: 40,
        badge: Badge::Bronze,
        category: AchievementCategory::Customers,
        target: Some(10),
    },
    Achievement {
        id: AchievementId::Customers50,
        title: "Neighbourhood Favourite",
        description: "Add 50 customers",
        icon: IconTag::Users,
        points: 100,
        badge: Badge::Silver,
        category: AchievementCategory::Customers,
        target: Some(50),
    },
    Achievement {
        id: AchievementId::Customers100,
        title: "Household Name",
        description: "Add 100 customers",
        icon: IconTag::Users,
        points: 200,
        badge: Badge::Gold,
        category: AchievementCategory::Customers,
        target: Some(100),
    },
    Achievement {
        id: AchievementId::LoyaltyProgram,
        title: "Loyalty Builder",
        description: "Activate the loyalty program",
        icon: IconTag::Heart,
        points: 40,
        badge: Badge::Silver,
        category: AchievementCategory::Customers,
        target: None,
    },
    // === POWER USER ===
    Achievement {
        id: AchievementId::AdminUnlocked,
        title: "Behind the Counter",
        description: "Unlock the admin panel",
        icon: IconTag::Shield,
        points: 20,
        badge: Badge::Bronze,
        category: AchievementCategory::PowerUser,
        target: None,
    },
    Achievement {
        id: AchievementId::DataExport,
        title: "Bookkeeper",
        description: "Export your data",
        icon: IconTag::Download,
        points: 25,
        badge: Badge::Bronze,
        category: AchievementCategory::PowerUser,
        target: None,
    },
    Achievement {
        id: AchievementId::ShortcutPro,
        title: "Keyboard Ninja",
        description: "Use keyboard shortcuts 5 times",
        icon: IconTag::Keyboard,
        points: 30,
        badge: Badge::Silver,
        category: AchievementCategory::PowerUser,
        target: Some(5),
    },
    Achievement {
        id: AchievementId::Consistent7,
        title: "Creature of Habit",
        description: "Open the shop 7 days in a row",
        icon: IconTag::Calendar,
        points: 70,
        badge: Badge::Silver,
        category: AchievementCategory::PowerUser,
        target: Some(7),
    },
    Achievement {
        id: AchievementId::FeatureExplorer,
        title: "Explorer",
        description: "Try 20 different features",
        icon: IconTag::Compass,
        points: 100,
        badge: Badge::Gold,
        category: AchievementCategory::PowerUser,
        target: Some(20),
    },
    // === MASTER ===
    Achievement {
        id: AchievementId::ShopMaster,
        title: "Shop Master",
        description: "Create 1,000 bills",
        icon: IconTag::Crown,
        points: 500,
        badge: Badge::Diamond,
        category: AchievementCategory::Master,
        target: Some(1000),
    },
    Achievement {
        id: AchievementId::InventoryMaster,
        title: "Inventory Master",
        description: "Add 500 products",
        icon: IconTag::Trophy,
        points: 300,
        badge: Badge::Platinum,
        category: AchievementCategory::Master,
        target: Some(500),
    },
    Achievement {
        id: AchievementId::CommunityPillar,
        title: "Community Pillar",
        description: "Add 500 customers",
        icon: IconTag::Star,
        points: 300,
        badge: Badge::Platinum,
        category: AchievementCategory::Master,
        target: Some(500),
    },
];

impl Achievement {
    /// Get achievement definition by ID
    pub fn get(id: AchievementId) -> Option<&'static Achievement> {
        ACHIEVEMENTS.iter().find(|a| a.id == id)
    }

    /// Get total number of achievements
    pub fn total_count() -> usize {
        ACHIEVEMENTS.len()
    }

    /// Get total possible points from all achievements
    pub fn total_points() -> u32 {
        ACHIEVEMENTS.iter().map(|a| a.points).sum()
    }

    /// Get achievements by category
    pub fn by_category(category: AchievementCategory) -> Vec<&'static Achievement> {
        ACHIEVEMENTS
            .iter()
            .filter(|a| a.category == category)
            .collect()
    }
}
